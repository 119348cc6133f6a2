//! # tmplver Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Filesystem helpers shared by the local object store, the file-backed
//! template registry and the CLI commands that read and write archives.
//!
//! - **`io`**: directory creation (`ensure_dir_exists`), whole-file reads of
//!   bytes and strings, and writes that create missing parent directories.
//!
//! ## Usage
//!
//! ```rust
//! use tmplver::common::fs::io;
//! # use tempfile::tempdir;
//!
//! # fn main() -> anyhow::Result<()> {
//! # let temp_dir = tempdir()?;
//! let path = temp_dir.path().join("objects/bundle.tar.gz");
//! io::write_bytes_to_file(&path, b"bytes")?;
//! assert_eq!(io::read_file_bytes(&path)?, b"bytes");
//! # Ok(())
//! # }
//! ```
//!

/// Basic file I/O operations (`ensure_dir_exists`, `read_file_bytes`, `write_bytes_to_file`, ...).
pub mod io;
