//! # tmplver Process Handler
//!
//! File: cli/src/commands/process.rs
//!
//! ## Overview
//!
//! Implements `tmplver process --key <KEY>`: treats `KEY` as a freshly
//! uploaded object and runs revision processing against the local object
//! store and the file-backed template registry from the configuration.
//!
//! ## Usage
//!
//! ```bash
//! # Keys are accepted in their URL-encoded notification form
//! tmplver process --key my+env%2Fbundle.tar.gz --template my-env-template
//!
//! # Service templates, keeping the three newest stored revisions
//! tmplver process --key svc/bundle.tar.gz --kind service --keep-versions 3
//! ```
//!
use anyhow::anyhow;
use clap::Parser;
use std::sync::Arc;
use tmplver::core::config::ConfigOverrides;
use tmplver::core::error::Result;
use tmplver::revision::{
    FileTemplateRegistry, LocalObjectStore, ProcessOutcome, ProcessorSettings, RevisionProcessor,
    TemplateKind, UploadEvent,
};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(about = "Register a template version for an uploaded bundle")]
pub struct ProcessArgs {
    /// Object key from the upload notification (URL-encoded form accepted).
    #[arg(long)]
    key: String,
    /// Bucket holding the object. Overrides `storage.bucket`.
    #[arg(long, env = "TMPLVER_BUCKET")]
    bucket: Option<String>,
    /// Template to register the version under. Overrides `template.name`.
    #[arg(long, env = "TMPLVER_TEMPLATE")]
    template: Option<String>,
    /// Kind of template. Overrides `template.kind`.
    #[arg(long, value_enum)]
    kind: Option<TemplateKind>,
    /// Stored object versions to keep. Overrides `retention.keep_versions`.
    #[arg(long, env = "TMPLVER_KEEP_VERSIONS")]
    keep_versions: Option<usize>,
}

pub async fn handle_process(args: ProcessArgs) -> Result<()> {
    info!("Handling process command...");
    debug!("Process args: {:?}", args);

    let cfg = super::load_config_with(ConfigOverrides {
        template_name: args.template,
        template_kind: args.kind,
        bucket: args.bucket,
        keep_versions: args.keep_versions,
        ..Default::default()
    })?;
    let template_name = cfg.template.name.clone().ok_or_else(|| {
        anyhow!("No template name configured; pass --template or set [template].name")
    })?;

    let processor = RevisionProcessor::new(
        Arc::new(LocalObjectStore::new(&cfg.storage.root)),
        Arc::new(FileTemplateRegistry::new(&cfg.registry.path)),
        ProcessorSettings {
            template_name,
            kind: cfg.template.kind,
            keep_versions: cfg.retention.keep_versions,
        },
    );

    let outcome = processor
        .process(&UploadEvent::new(cfg.storage.bucket.clone(), args.key))
        .await?;
    println!("{}", outcome);

    if let ProcessOutcome::VersionRegistered {
        version, decision, ..
    } = &outcome
    {
        println!("description: {}", version.description);
        if let Some(result) = &decision.fingerprint {
            println!("identical: {}", result.identical);
            println!("highest_version_number: {}", result.highest_version_number);
        }
    }
    Ok(())
}
