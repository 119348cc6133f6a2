//! # tmplver Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! The top-level `tmplver` subcommands. Each module defines its Clap argument
//! struct and an async `handle_*` function that `main.rs` routes to.
//!
//! ## Commands
//!
//! - `inspect`: list the version directories of a bundle.
//! - `compare`: fingerprint-compare two bundle revisions.
//! - `bundle`: pack a template directory into a gzip+tar bundle.
//! - `upload`: store a bundle as a new object version in the local store.
//! - `process`: run revision processing for a stored object.
//!
use tmplver::core::config::{self, Config, ConfigOverrides};
use tmplver::core::error::Result;

/// Implements `tmplver bundle`.
pub mod bundle;
/// Implements `tmplver compare`.
pub mod compare;
/// Implements `tmplver inspect`.
pub mod inspect;
/// Implements `tmplver process`.
pub mod process;
/// Implements `tmplver upload`.
pub mod upload;

/// Loads the layered configuration and applies command-line overrides on top.
fn load_config_with(overrides: ConfigOverrides) -> Result<Config> {
    let mut cfg = config::load_config()?;
    overrides.apply(&mut cfg)?;
    Ok(cfg)
}
