//! # tmplver Inspect Handler
//!
//! File: cli/src/commands/inspect.rs
//!
//! ## Overview
//!
//! Implements `tmplver inspect <ARCHIVE>`: streams the bundle through the
//! archive inspector and prints its version tokens, one per line, in the order
//! they first appear in the archive.
//!
//! ```bash
//! tmplver inspect bundle.tar.gz
//! # v1/
//! # v2/
//! ```
//!
use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tmplver::common::archive::inspect;
use tmplver::core::error::{Result, TmplverError};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(about = "List the version directories of a template bundle")]
pub struct InspectArgs {
    /// Path to a gzip-compressed tar bundle.
    archive: PathBuf,
}

pub async fn handle_inspect(args: InspectArgs) -> Result<()> {
    info!("Handling inspect command...");
    debug!("Inspect args: {:?}", args);

    let file = File::open(&args.archive)
        .with_context(|| format!("Failed to open archive {}", args.archive.display()))?;
    let versions = inspect::inspect_reader(BufReader::new(file))
        .map_err(TmplverError::from)
        .with_context(|| format!("Failed to inspect {}", args.archive.display()))?;

    info!(
        "Found {} version director{} in {}",
        versions.len(),
        if versions.len() == 1 { "y" } else { "ies" },
        args.archive.display()
    );
    for token in versions.tokens() {
        println!("{}", token);
    }
    Ok(())
}
