//! # tmplver Bundle Handler
//!
//! File: cli/src/commands/bundle.rs
//!
//! ## Overview
//!
//! Implements `tmplver bundle <DIR> --output <FILE>`: packs a template
//! directory into a gzip-compressed tar bundle, every entry placed under a
//! root directory (`--name`, defaulting to the directory's own name).
//! The written bundle is inspected afterwards so the version directories it
//! carries are reported.
//!
use anyhow::{anyhow, Context};
use clap::Parser;
use std::path::PathBuf;
use tmplver::common::archive::{inspect, tar};
use tmplver::common::fs::io;
use tmplver::core::error::{Result, TmplverError};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(about = "Pack a template directory into a gzip+tar bundle")]
pub struct BundleArgs {
    /// Template directory to pack.
    dir: PathBuf,
    /// Root directory name inside the archive. Defaults to the name of DIR.
    #[arg(long)]
    name: Option<String>,
    /// Where to write the bundle.
    #[arg(short, long)]
    output: PathBuf,
}

pub async fn handle_bundle(args: BundleArgs) -> Result<()> {
    info!("Handling bundle command...");
    debug!("Bundle args: {:?}", args);

    if !args.dir.is_dir() {
        return Err(anyhow!("'{}' is not a directory", args.dir.display()));
    }
    let root_name = match args.name {
        Some(name) => name,
        None => args
            .dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", args.dir.display()))?
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("Cannot derive a root name from '{}'", args.dir.display()))?,
    };

    let payload = tar::create_archive(&args.dir, &root_name)?;
    let versions = inspect::inspect(&payload).map_err(TmplverError::from)?;
    if versions.is_empty() {
        warn!(
            "Bundle has no version directories; it cannot be fingerprinted as a newer revision"
        );
    }
    io::write_bytes_to_file(&args.output, &payload)?;

    let tokens: Vec<&str> = versions.tokens().iter().map(|t| t.as_str()).collect();
    println!(
        "Wrote {} ({} bytes, versions: {})",
        args.output.display(),
        payload.len(),
        if tokens.is_empty() {
            "none".to_string()
        } else {
            tokens.join(", ")
        }
    );
    Ok(())
}
