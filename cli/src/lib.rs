//! # tmplver Library
//!
//! File: cli/src/lib.rs
//!
//! ## Overview
//!
//! Versioning of deployment-template bundles. A bundle is a gzip-compressed
//! tar archive whose `v<N>/` directories name the API versions it ships. The
//! set of those directories is the bundle's fingerprint: two revisions with
//! the same fingerprint differ by a minor version, otherwise by a major one.
//!
//! ## Architecture
//!
//! - `fingerprint`: version tokens, version sets and the comparison rule.
//! - `common`: archive inspection and building, filesystem helpers.
//! - `revision`: the upload-to-registered-version orchestration and its
//!   storage and registry collaborators.
//! - `core`: error types and layered configuration.
//!
pub mod common;
pub mod core;
pub mod fingerprint;
pub mod revision;
