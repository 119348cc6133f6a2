//! # tmplver TAR Archive Building (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//!
//! ## Overview
//!
//! This module creates gzipped tarballs (`.tar.gz`), the format in which
//! template bundles are uploaded to the object store. It is the write-side
//! counterpart of `common::archive::inspect`.
//!
//! ## Architecture
//!
//! The module leverages the `tar` crate for building the archive structure and
//! the `flate2` crate for Gzip compression. Two entry points exist:
//!
//! - `create_archive`: packs a directory tree from disk, every entry placed
//!   under a root directory name inside the archive.
//! - `build_archive`: packs an explicit list of in-memory entries
//!   (directories and small files), used when the exact entry sequence
//!   matters.
//!
//! ## Usage
//!
//! ```rust
//! use tmplver::common::archive::tar::{build_archive, create_archive, ArchiveEntry};
//! # use std::fs;
//! # use tempfile::tempdir;
//!
//! # fn main() -> anyhow::Result<()> {
//! # let temp_dir = tempdir()?;
//! # fs::create_dir_all(temp_dir.path().join("v1/infrastructure"))?;
//! // Pack a template directory as `my-template/...`
//! let bundle: Vec<u8> = create_archive(temp_dir.path(), "my-template")?;
//!
//! // Or build one entry by entry
//! let bundle = build_archive(&[
//!     ArchiveEntry::Directory("my-template/v1/"),
//!     ArchiveEntry::File("my-template/v1/schema.yaml", b"schema: {}"),
//! ])?;
//! # let _ = bundle;
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::Result;
use anyhow::Context;
use flate2::{write::GzEncoder, Compression};
use std::io;
use std::path::Path;
use tar::{Builder, EntryType, Header};

/// One entry of an archive built in memory by [`build_archive`].
#[derive(Debug, Clone, Copy)]
pub enum ArchiveEntry<'a> {
    /// A directory entry with the given archive path.
    Directory(&'a str),
    /// A regular file entry with the given archive path and contents.
    File(&'a str, &'a [u8]),
}

/// # Create Gzipped TAR Bundle (`create_archive`)
///
/// Creates a gzipped TAR archive in memory containing the contents of
/// `source_dir`, with every entry placed under `root_name/` inside the
/// archive.
///
/// ## Errors
///
/// Returns an `Err` if:
/// - `source_dir` or anything below it cannot be read.
/// - Finishing the TAR archive structure or the Gzip stream fails.
pub fn create_archive(source_dir: &Path, root_name: &str) -> Result<Vec<u8>> {
    let mut tar_gz_bytes = Vec::new();
    let enc = GzEncoder::new(&mut tar_gz_bytes, Compression::default());
    let mut tar_builder = Builder::new(enc);

    tar_builder
        .append_dir_all(root_name, source_dir)
        .with_context(|| {
            format!(
                "Failed to add directory '{}' contents to the tar archive",
                source_dir.display()
            )
        })?;

    let encoder = tar_builder
        .into_inner()
        .context("Failed to finalize tar archive structure")?;
    encoder
        .finish()
        .context("Failed to finish gzip compression stream")?;

    Ok(tar_gz_bytes)
}

/// # Build Gzipped TAR From Entries (`build_archive`)
///
/// Builds a gzipped TAR archive whose entries appear exactly in the order of
/// `entries`. Directories get mode `0755`, files `0644`.
pub fn build_archive(entries: &[ArchiveEntry<'_>]) -> Result<Vec<u8>> {
    let mut tar_gz_bytes = Vec::new();
    let enc = GzEncoder::new(&mut tar_gz_bytes, Compression::default());
    let mut tar_builder = Builder::new(enc);

    for entry in entries {
        let mut header = Header::new_gnu();
        match *entry {
            ArchiveEntry::Directory(path) => {
                header.set_entry_type(EntryType::Directory);
                header.set_mode(0o755);
                header.set_size(0);
                tar_builder
                    .append_data(&mut header, path, io::empty())
                    .with_context(|| format!("Failed to add directory '{}' to archive", path))?;
            }
            ArchiveEntry::File(path, contents) => {
                header.set_entry_type(EntryType::Regular);
                header.set_mode(0o644);
                header.set_size(contents.len() as u64);
                tar_builder
                    .append_data(&mut header, path, contents)
                    .with_context(|| format!("Failed to add file '{}' to archive", path))?;
            }
        }
    }

    let encoder = tar_builder
        .into_inner()
        .context("Failed to finalize tar archive structure")?;
    encoder
        .finish()
        .context("Failed to finish gzip compression stream")?;

    Ok(tar_gz_bytes)
}
