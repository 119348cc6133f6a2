//! # tmplver Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure components shared by the
//! fingerprinting core, the revision orchestrator and the CLI commands.
//!
//! ## Architecture
//!
//! - `config`: Configuration loading, merging, overriding and validation
//! - `error`: Error types (`FingerprintError`, `TmplverError`) and the `Result` alias
//!
//! ## Usage
//!
//! ```rust
//! use tmplver::core::config; // For loading configuration
//! use tmplver::core::error::{FingerprintError, Result, TmplverError}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
