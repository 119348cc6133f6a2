//! # tmplver Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared helpers used by the fingerprint core, the revision collaborators and
//! the CLI commands.
//!
//! - **`archive`**: streaming inspection of gzip+tar bundles and bundle creation.
//! - **`fs`**: whole-file reads and writes, directory creation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tmplver::common::{archive, fs};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let payload = fs::io::read_file_bytes(Path::new("bundle.tar.gz"))?;
//! let versions = archive::inspect::inspect(&payload)?;
//! println!("{} version directories", versions.len());
//! # Ok(())
//! # }
//! ```
//!

/// Inspection and creation of gzip-compressed tar bundles.
pub mod archive;
/// Filesystem helpers (reads, writes, directory creation).
pub mod fs;
