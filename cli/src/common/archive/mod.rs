//! # tmplver Archive Utilities Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! This module groups everything tmplver does with gzip-compressed tar
//! archives, the format template bundles are stored in.
//!
//! ## Architecture
//!
//! - **`inspect`**: streams an archive and extracts its version directories
//!   (the fingerprint used to classify a change as minor or major).
//! - **`tar`**: builds gzipped tarballs from a directory tree or from an
//!   explicit list of entries.
//!
//! ## Usage
//!
//! ```rust
//! use tmplver::common::archive::{inspect, tar};
//!
//! # fn main() -> anyhow::Result<()> {
//! let bundle = tar::build_archive(&[tar::ArchiveEntry::Directory("tpl/v1/")])?;
//! let versions = inspect::inspect(&bundle)?;
//! assert_eq!(versions.tokens()[0].as_str(), "v1/");
//! # Ok(())
//! # }
//! ```
//!

pub mod inspect;
pub mod tar;
