//! # tmplver Fingerprint Comparator (`fingerprint`)
//!
//! File: cli/src/fingerprint/mod.rs
//!
//! ## Overview
//!
//! This module compares the fingerprints of two archive revisions. A
//! fingerprint is the `VersionSet` extracted by the archive inspector
//! (`common::archive::inspect`). Two revisions whose sorted version sets are
//! equal are a **minor** change; anything else is a **major** change.
//!
//! ## Architecture
//!
//! - `token`: `VersionToken` and `VersionSet`.
//! - `compare`: synchronous comparison of two optional payloads.
//! - `compare_concurrent`: the same comparison with both inspections running
//!   on blocking worker tasks at the same time.
//! - `evaluate`: the comparison rule on already extracted sets.
//!
//! The comparator does no logging. Every failure is returned as a
//! `FingerprintError` and no partial result is ever produced.
//!
//! ## Examples
//!
//! ```rust
//! use tmplver::common::archive::tar::{build_archive, ArchiveEntry};
//! use tmplver::fingerprint;
//!
//! # fn main() -> anyhow::Result<()> {
//! let older = build_archive(&[ArchiveEntry::Directory("env/v1/")])?;
//! let newer = build_archive(&[
//!     ArchiveEntry::Directory("env/v1/"),
//!     ArchiveEntry::Directory("env/v2/"),
//! ])?;
//!
//! let result = fingerprint::compare(Some(older.as_slice()), Some(newer.as_slice()))?;
//! assert!(!result.identical);
//! assert_eq!(result.highest_version_number, 2);
//! # Ok(())
//! # }
//! ```
//!
use crate::common::archive::inspect;
use crate::core::error::FingerprintError;
use serde::Serialize;
use std::fmt;

pub mod token;

pub use token::{VersionSet, VersionToken};

/// Outcome of comparing two archive revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FingerprintResult {
    /// Both revisions carry exactly the same version directories.
    pub identical: bool,
    /// Number of the lexicographically-last token of the newer revision.
    pub highest_version_number: u64,
}

impl FingerprintResult {
    pub fn change(&self) -> ChangeKind {
        if self.identical {
            ChangeKind::Minor
        } else {
            ChangeKind::Major
        }
    }
}

/// Classification of the difference between two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Minor,
    Major,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Minor => write!(f, "minor"),
            ChangeKind::Major => write!(f, "major"),
        }
    }
}

/// Version set of an optional payload. An absent payload has an empty set.
pub fn fingerprint(payload: Option<&[u8]>) -> Result<VersionSet, FingerprintError> {
    match payload {
        Some(bytes) => inspect::inspect(bytes),
        None => Ok(VersionSet::new()),
    }
}

/// Compares two archive revisions.
///
/// `highest_version_number` is taken from `newer` only; `identical` does not
/// depend on argument order.
///
/// # Errors
///
/// - `Decode` if either payload is not a gzip-compressed tar archive.
/// - `EmptySet` if `newer` is absent or carries no version directories.
pub fn compare(
    older: Option<&[u8]>,
    newer: Option<&[u8]>,
) -> Result<FingerprintResult, FingerprintError> {
    let older = fingerprint(older)?;
    let newer = fingerprint(newer)?;
    evaluate(&older, &newer)
}

/// Same as [`compare`], with both inspections running concurrently on
/// blocking worker tasks.
pub async fn compare_concurrent(
    older: Option<Vec<u8>>,
    newer: Option<Vec<u8>>,
) -> Result<FingerprintResult, FingerprintError> {
    let older_task = tokio::task::spawn_blocking(move || fingerprint(older.as_deref()));
    let newer_task = tokio::task::spawn_blocking(move || fingerprint(newer.as_deref()));
    let (older, newer) = tokio::try_join!(older_task, newer_task)?;
    evaluate(&older?, &newer?)
}

/// Applies the comparison rule to two extracted version sets.
pub fn evaluate(
    older: &VersionSet,
    newer: &VersionSet,
) -> Result<FingerprintResult, FingerprintError> {
    let older_sorted = older.sorted();
    let newer_sorted = newer.sorted();
    let highest = newer_sorted.last().ok_or(FingerprintError::EmptySet)?;

    Ok(FingerprintResult {
        identical: older_sorted == newer_sorted,
        highest_version_number: highest.version_number()?,
    })
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::archive::tar::{build_archive, ArchiveEntry};

    fn archive(dirs: &[&str]) -> Vec<u8> {
        let entries: Vec<ArchiveEntry> = dirs.iter().map(|d| ArchiveEntry::Directory(*d)).collect();
        build_archive(&entries).unwrap()
    }

    fn set_of(segments: &[&str]) -> VersionSet {
        segments.iter().map(|s| VersionToken::new(*s)).collect()
    }

    #[test]
    fn test_compare_same_payload_is_identical() {
        let payload = archive(&["tpl/v1/", "tpl/v2/"]);
        let result = compare(Some(payload.as_slice()), Some(payload.as_slice())).unwrap();
        assert!(result.identical);
        assert_eq!(result.highest_version_number, 2);
        assert_eq!(result.change(), ChangeKind::Minor);
    }

    #[test]
    fn test_compare_new_version_directory() {
        let older = archive(&["tpl/v1/", "tpl/v2/"]);
        let newer = archive(&["tpl/v1/", "tpl/v2/", "tpl/v3/"]);
        let result = compare(Some(older.as_slice()), Some(newer.as_slice())).unwrap();
        assert!(!result.identical);
        assert_eq!(result.highest_version_number, 3);
        assert_eq!(result.change(), ChangeKind::Major);
    }

    #[test]
    fn test_compare_absent_older() {
        let newer = archive(&["tpl/v5/"]);
        let result = compare(None, Some(newer.as_slice())).unwrap();
        assert!(!result.identical);
        assert_eq!(result.highest_version_number, 5);
    }

    #[test]
    fn test_compare_absent_newer_is_empty_set() {
        let older = archive(&["tpl/v1/"]);
        assert!(matches!(
            compare(Some(older.as_slice()), None),
            Err(FingerprintError::EmptySet)
        ));
    }

    #[test]
    fn test_compare_newer_without_versions_is_empty_set() {
        let newer = archive(&["tpl/docs/"]);
        assert!(matches!(
            compare(None, Some(newer.as_slice())),
            Err(FingerprintError::EmptySet)
        ));
    }

    #[test]
    fn test_identical_ignores_discovery_order() {
        let a = archive(&["tpl/v2/", "tpl/v1/"]);
        let b = archive(&["tpl/v1/", "tpl/v2/"]);
        assert!(compare(Some(a.as_slice()), Some(b.as_slice())).unwrap().identical);
    }

    #[test]
    fn test_identical_is_symmetric_highest_is_not() {
        let a = archive(&["tpl/v1/"]);
        let b = archive(&["tpl/v1/", "tpl/v4/"]);
        let ab = compare(Some(a.as_slice()), Some(b.as_slice())).unwrap();
        let ba = compare(Some(b.as_slice()), Some(a.as_slice())).unwrap();
        assert_eq!(ab.identical, ba.identical);
        assert_eq!(ab.highest_version_number, 4);
        assert_eq!(ba.highest_version_number, 1);
    }

    #[test]
    fn test_lexicographic_highest() {
        let result = evaluate(&VersionSet::new(), &set_of(&["v9/", "v10/"])).unwrap();
        assert_eq!(result.highest_version_number, 9);
    }

    #[test]
    fn test_compare_decode_error_propagates() {
        let newer = archive(&["tpl/v1/"]);
        assert!(matches!(
            compare(Some(b"plain text".as_slice()), Some(newer.as_slice())),
            Err(FingerprintError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_compare_concurrent_matches_compare() {
        let older = archive(&["tpl/v1/", "tpl/v2/"]);
        let newer = archive(&["tpl/v2/", "tpl/v1/"]);
        let expected = compare(Some(older.as_slice()), Some(newer.as_slice())).unwrap();
        let result = compare_concurrent(Some(older), Some(newer)).await.unwrap();
        assert_eq!(result, expected);
        assert!(result.identical);
    }

    #[tokio::test]
    async fn test_compare_concurrent_empty_newer() {
        let result = compare_concurrent(None, None).await;
        assert!(matches!(result, Err(FingerprintError::EmptySet)));
    }
}
