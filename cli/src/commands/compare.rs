//! # tmplver Compare Handler
//!
//! File: cli/src/commands/compare.rs
//!
//! ## Overview
//!
//! Implements `tmplver compare [--older <ARCHIVE>] <NEWER>`. Without `--older`
//! the newer bundle is compared against an absent revision, which always
//! counts as a major change.
//!
//! ```bash
//! tmplver compare --older previous.tar.gz current.tar.gz
//! # identical: false
//! # highest_version_number: 3
//! # change: major
//! ```
//!
use clap::Parser;
use std::path::PathBuf;
use tmplver::common::fs::io;
use tmplver::core::error::{Result, TmplverError};
use tmplver::fingerprint;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(about = "Compare the version directories of two bundle revisions")]
pub struct CompareArgs {
    /// Previous revision. Omit to compare against an absent revision.
    #[arg(long)]
    older: Option<PathBuf>,
    /// Current revision.
    newer: PathBuf,
}

pub async fn handle_compare(args: CompareArgs) -> Result<()> {
    info!("Handling compare command...");
    debug!("Compare args: {:?}", args);

    let older = args
        .older
        .as_deref()
        .map(io::read_file_bytes)
        .transpose()?;
    let newer = io::read_file_bytes(&args.newer)?;

    let result = fingerprint::compare_concurrent(older, Some(newer))
        .await
        .map_err(TmplverError::from)?;

    println!("identical: {}", result.identical);
    println!("highest_version_number: {}", result.highest_version_number);
    println!("change: {}", result.change());
    Ok(())
}
