//! # tmplver Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout tmplver. There are two
//! layers:
//!
//! - `FingerprintError`: the typed errors of the fingerprinting core
//!   (archive inspection and comparison). The core never logs or swallows a
//!   failure; every problem surfaces as one of these variants so the caller can
//!   decide policy (e.g. treat `EmptySet` as a major change).
//! - `TmplverError`: application-level errors raised by the orchestrator, the
//!   local collaborators and configuration loading.
//! - `Result<T>`: a type alias for `anyhow::Result<T>` used by the application
//!   layers for flexible error handling with context.
//!
//! ## Examples
//!
//! ```rust
//! use tmplver::core::error::{FingerprintError, TmplverError};
//!
//! // Recover a typed error from an anyhow chain
//! # fn handle(err: anyhow::Error) {
//! match err.downcast_ref::<TmplverError>() {
//!     Some(TmplverError::Fingerprint(FingerprintError::EmptySet)) => {
//!         println!("newer archive carries no version directories");
//!     }
//!     _ => eprintln!("Error: {}", err),
//! }
//! # }
//! ```
//!
use thiserror::Error;

/// Errors produced by the fingerprinting core.
#[derive(Error, Debug)]
pub enum FingerprintError {
    /// The payload is not gzip, or the decompressed stream is not a valid tar archive.
    #[error("Archive decode error: {0}")]
    Decode(#[from] std::io::Error),

    /// The newer archive yielded no version tokens, so no highest version exists.
    #[error("No version directories found in the newer archive")]
    EmptySet,

    /// The digits of a version token do not fit in a `u64`.
    #[error("Version token '{token}' does not carry a usable version number")]
    InvalidVersionNumber { token: String },

    #[error("Version segment pattern is unavailable")]
    PatternUnavailable,

    /// A blocking inspection task panicked or was cancelled.
    #[error("Archive inspection task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Application-level errors.
#[derive(Error, Debug)]
pub enum TmplverError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Object '{key}' not found in bucket '{bucket}'.")]
    ObjectNotFound { bucket: String, key: String },

    #[error("No stored versions of '{key}' in bucket '{bucket}'.")]
    NoObjectVersions { bucket: String, key: String },

    #[error("Invalid object key '{0}': malformed percent-encoding")]
    InvalidObjectKey(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),
}

/// Type alias for Result using anyhow::Error for the application layers.
pub type Result<T> = anyhow::Result<T>;
