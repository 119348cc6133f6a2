//! # tmplver Archive Inspector (`common::archive::inspect`)
//!
//! File: cli/src/common/archive/inspect.rs
//!
//! ## Overview
//!
//! Streams a gzip-compressed tar archive and collects the version directories
//! it contains. A version directory is a directory entry whose path holds a
//! segment of the form `v<digits>` (`env/v1/`, `./V12/infrastructure/`).
//!
//! ## Architecture
//!
//! - The first two bytes are checked against the gzip magic before any
//!   decoding, so empty or foreign payloads fail with a `Decode` error.
//! - `flate2::read::MultiGzDecoder` feeds `tar::Archive` directly, so
//!   archives split over several concatenated gzip members (`pigz`, `cat a.gz
//!   b.gz`) are read to the end. Entries are visited one at a time and the
//!   archive is never held in memory whole.
//! - Each entry body is drained before the next header is read.
//! - Only the first version segment of a name counts. Tokens are normalized
//!   by `VersionToken::new` and deduplicated by `VersionSet::insert`.
//!
//! The inspector does not log; all failures surface as `FingerprintError`.
//!
use crate::core::error::FingerprintError;
use crate::fingerprint::{VersionSet, VersionToken};
use flate2::read::MultiGzDecoder;
use regex::Regex;
use std::io::{self, Cursor, Read};
use std::sync::LazyLock;
use tar::{Archive, EntryType};

/// gzip magic bytes (RFC 1952).
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A `v<digits>` path segment bounded by `/` or the ends of the name.
static VERSION_SEGMENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:^|/)([vV][0-9]+)(?:/|$)").ok());

pub fn is_gzip_magic(header: &[u8]) -> bool {
    header.len() >= 2 && header[0] == GZIP_MAGIC[0] && header[1] == GZIP_MAGIC[1]
}

/// Collects the version tokens of an in-memory archive.
pub fn inspect(payload: &[u8]) -> Result<VersionSet, FingerprintError> {
    inspect_reader(payload)
}

/// Collects the version tokens of a gzip+tar stream.
///
/// Tokens are returned in the order their directories first appear.
///
/// # Errors
///
/// `Decode` if the stream is not gzip or the decompressed bytes are not a
/// valid tar archive.
pub fn inspect_reader<R: Read>(mut reader: R) -> Result<VersionSet, FingerprintError> {
    let Some(pattern) = VERSION_SEGMENT.as_ref() else {
        return Err(FingerprintError::PatternUnavailable);
    };

    let mut magic = [0u8; 2];
    reader.read_exact(&mut magic).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => {
            io::Error::new(io::ErrorKind::InvalidData, "payload too short to be gzip")
        }
        _ => err,
    })?;
    if !is_gzip_magic(&magic) {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "payload is not gzip-compressed").into());
    }

    let decoder = MultiGzDecoder::new(Cursor::new(magic).chain(reader));
    let mut archive = Archive::new(decoder);
    let mut versions = VersionSet::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();

        if is_directory(entry.header().entry_type(), &name) {
            if let Some(token) = first_version_segment(pattern, &name) {
                versions.insert(token);
            }
        }

        io::copy(&mut entry, &mut io::sink())?;
    }

    Ok(versions)
}

/// Old-style archives mark directories as regular entries ending in `/`.
fn is_directory(entry_type: EntryType, name: &str) -> bool {
    entry_type.is_dir() || (entry_type.is_file() && name.ends_with('/'))
}

fn first_version_segment(pattern: &Regex, name: &str) -> Option<VersionToken> {
    pattern
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|segment| VersionToken::new(segment.as_str()))
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::archive::tar::{build_archive, ArchiveEntry};
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    fn tokens(set: &VersionSet) -> Vec<&str> {
        set.tokens().iter().map(|t| t.as_str()).collect()
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(bytes).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_inspect_normalizes_and_deduplicates() {
        let payload = build_archive(&[
            ArchiveEntry::Directory("v1/"),
            ArchiveEntry::Directory("V2/"),
            ArchiveEntry::Directory("v2/"),
            ArchiveEntry::Directory("docs/"),
            ArchiveEntry::Directory("v10/"),
        ])
        .unwrap();

        let set = inspect(&payload).unwrap();
        assert_eq!(tokens(&set), vec!["v1/", "v2/", "v10/"]);
    }

    #[test]
    fn test_inspect_nested_and_first_match_only() {
        let payload = build_archive(&[
            ArchiveEntry::Directory("env-template/"),
            ArchiveEntry::Directory("env-template/v3/"),
            ArchiveEntry::Directory("env-template/v3/v4/"),
            ArchiveEntry::Directory("env-template/v3/infrastructure/"),
        ])
        .unwrap();

        let set = inspect(&payload).unwrap();
        assert_eq!(tokens(&set), vec!["v3/"]);
    }

    #[test]
    fn test_inspect_skips_files_but_keeps_reading() {
        let big = vec![b'x'; 10_000];
        let payload = build_archive(&[
            ArchiveEntry::File("tpl/v7/readme.md", &big),
            ArchiveEntry::Directory("tpl/v1/"),
            ArchiveEntry::File("tpl/v1/schema.yaml", b"schema: {}"),
            ArchiveEntry::Directory("tpl/v2/"),
        ])
        .unwrap();

        let set = inspect(&payload).unwrap();
        assert_eq!(tokens(&set), vec!["v1/", "v2/"]);
    }

    #[test]
    fn test_inspect_ignores_lookalike_segments() {
        let payload = build_archive(&[
            ArchiveEntry::Directory("tpl/v1beta/"),
            ArchiveEntry::Directory("tpl/dev1/"),
            ArchiveEntry::Directory("tpl/v/"),
        ])
        .unwrap();

        assert!(inspect(&payload).unwrap().is_empty());
    }

    #[test]
    fn test_inspect_empty_archive() {
        let payload = build_archive(&[]).unwrap();
        assert!(inspect(&payload).unwrap().is_empty());
    }

    #[test]
    fn test_inspect_is_deterministic() {
        let payload = build_archive(&[
            ArchiveEntry::Directory("a/v3/"),
            ArchiveEntry::Directory("a/v1/"),
            ArchiveEntry::Directory("a/v2/"),
        ])
        .unwrap();

        let first = inspect(&payload).unwrap();
        let second = inspect(&payload).unwrap();
        assert_eq!(first, second);
        assert_eq!(tokens(&first), vec!["v3/", "v1/", "v2/"]);
    }

    #[test]
    fn test_inspect_reader_streams_from_reader() {
        let payload = build_archive(&[ArchiveEntry::Directory("tpl/v9/")]).unwrap();
        let set = inspect_reader(Cursor::new(payload)).unwrap();
        assert_eq!(tokens(&set), vec!["v9/"]);
    }

    #[test]
    fn test_inspect_reads_every_gzip_member() {
        let mut builder = ::tar::Builder::new(Vec::new());
        for dir in ["t/v1/", "t/v2/"] {
            let mut header = ::tar::Header::new_gnu();
            header.set_entry_type(EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            builder.append_data(&mut header, dir, io::empty()).unwrap();
        }
        let raw = builder.into_inner().unwrap();

        // First member ends right after the first header block.
        let mut payload = gzip(&raw[..512]);
        payload.extend(gzip(&raw[512..]));

        let set = inspect(&payload).unwrap();
        assert_eq!(tokens(&set), vec!["v1/", "v2/"]);
    }

    #[test]
    fn test_inspect_long_gnu_path() {
        let long_dir = format!("tpl/{}/v7/", "a".repeat(150));
        let payload = build_archive(&[ArchiveEntry::Directory(&long_dir)]).unwrap();
        let set = inspect(&payload).unwrap();
        assert_eq!(tokens(&set), vec!["v7/"]);
    }

    #[test]
    fn test_inspect_rejects_non_gzip() {
        let err = inspect(b"definitely not gzip").unwrap_err();
        assert!(matches!(err, FingerprintError::Decode(_)));
        assert!(err.to_string().contains("not gzip-compressed"));
    }

    #[test]
    fn test_inspect_rejects_empty_payload() {
        assert!(matches!(inspect(&[]), Err(FingerprintError::Decode(_))));
    }

    #[test]
    fn test_inspect_rejects_gzip_of_non_tar() {
        let payload = gzip(b"hello world");
        assert!(matches!(inspect(&payload), Err(FingerprintError::Decode(_))));
    }

    #[test]
    fn test_inspect_rejects_truncated_gzip() {
        let payload = build_archive(&[ArchiveEntry::Directory("tpl/v1/")]).unwrap();
        let truncated = &payload[..payload.len() / 2];
        assert!(matches!(inspect(truncated), Err(FingerprintError::Decode(_))));
    }
}
