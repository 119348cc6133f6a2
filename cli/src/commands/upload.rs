//! # tmplver Upload Handler
//!
//! File: cli/src/commands/upload.rs
//!
//! ## Overview
//!
//! Implements `tmplver upload <ARCHIVE> --key <KEY>`: stores the bundle as a
//! new version of `KEY` in the local object store configured under
//! `[storage]`. `--commit` records the source commit in the version's
//! `commithash` metadata, which `process` uses in the version description.
//!
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tmplver::common::archive::inspect;
use tmplver::common::fs::io;
use tmplver::core::config::ConfigOverrides;
use tmplver::core::error::Result;
use tmplver::revision::{LocalObjectStore, COMMIT_HASH_METADATA_KEY};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(about = "Store a bundle as a new object version in the local store")]
pub struct UploadArgs {
    /// Path to the bundle to store.
    archive: PathBuf,
    /// Object key to store the bundle under.
    #[arg(long)]
    key: String,
    /// Bucket to store into. Overrides `storage.bucket`.
    #[arg(long, env = "TMPLVER_BUCKET")]
    bucket: Option<String>,
    /// Commit the bundle was built from.
    #[arg(long)]
    commit: Option<String>,
}

pub async fn handle_upload(args: UploadArgs) -> Result<()> {
    info!("Handling upload command...");
    debug!("Upload args: {:?}", args);

    let cfg = super::load_config_with(ConfigOverrides {
        bucket: args.bucket.clone(),
        ..Default::default()
    })?;

    let payload = io::read_file_bytes(&args.archive)?;
    if !inspect::is_gzip_magic(&payload) {
        warn!(
            "{} does not look gzip-compressed; processing it will fail",
            args.archive.display()
        );
    }

    let mut metadata = BTreeMap::new();
    if let Some(commit) = args.commit {
        metadata.insert(COMMIT_HASH_METADATA_KEY.to_string(), commit);
    }

    let store = LocalObjectStore::new(&cfg.storage.root);
    let version = store
        .put_object(&cfg.storage.bucket, &args.key, &payload, metadata)
        .await?;

    println!(
        "Stored version {} of '{}' in bucket '{}'",
        version.version_id, version.key, version.bucket
    );
    Ok(())
}
