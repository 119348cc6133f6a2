//! # tmplver Revision Processing (`revision`)
//!
//! File: cli/src/revision/mod.rs
//!
//! ## Overview
//!
//! This module turns "a new template bundle was uploaded" into "a new template
//! version was registered". It sequences retrieval of the two most recent
//! stored revisions, the fingerprint comparison, the minor/major decision, the
//! registration call and the pruning of old revisions.
//!
//! ## Architecture
//!
//! The storage service and the template registry are collaborators behind two
//! async traits, so the orchestrator never touches global clients:
//!
//! - `ObjectStore`: versioned blob storage (list, head, get, delete).
//! - `TemplateRegistry`: template lookup, creation and version registration.
//!
//! Submodules:
//!
//! - `key`: decoding of URL-encoded object keys from upload notifications.
//! - `orchestrator`: `RevisionProcessor`, the sequencing logic.
//! - `local_store`: `LocalObjectStore`, a filesystem-backed `ObjectStore`.
//! - `registry`: `FileTemplateRegistry`, a TOML-file-backed `TemplateRegistry`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tmplver::revision::{
//!     FileTemplateRegistry, LocalObjectStore, ProcessorSettings, RevisionProcessor,
//!     TemplateKind, UploadEvent,
//! };
//!
//! # async fn run() -> anyhow::Result<()> {
//! let processor = RevisionProcessor::new(
//!     Arc::new(LocalObjectStore::new("/var/lib/tmplver/objects")),
//!     Arc::new(FileTemplateRegistry::new("/var/lib/tmplver/registry.toml")),
//!     ProcessorSettings {
//!         template_name: "env-template".into(),
//!         kind: TemplateKind::Environment,
//!         keep_versions: 5,
//!     },
//! );
//! let outcome = processor
//!     .process(&UploadEvent::new("templates", "env/bundle.tar.gz"))
//!     .await?;
//! println!("{}", outcome);
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod key;
pub mod local_store;
pub mod orchestrator;
pub mod registry;

pub use key::decode_object_key;
pub use local_store::LocalObjectStore;
pub use orchestrator::{ProcessOutcome, ProcessorSettings, RevisionDecision, RevisionProcessor};
pub use registry::FileTemplateRegistry;

/// Metadata key holding the commit the bundle was built from.
pub const COMMIT_HASH_METADATA_KEY: &str = "commithash";

/// Kind of deployment template a bundle belongs to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    Environment,
    Service,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Environment => write!(f, "environment"),
            TemplateKind::Service => write!(f, "service"),
        }
    }
}

/// Notification that an object was written. `key` is still URL-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEvent {
    pub bucket: String,
    pub key: String,
}

impl UploadEvent {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// One stored revision of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectVersion {
    pub bucket: String,
    pub key: String,
    pub version_id: String,
    pub last_modified: DateTime<Utc>,
    /// 1-based position by `last_modified`; `0` until numbered by [`order_versions`].
    pub version_number: usize,
}

/// User metadata attached to the latest revision of an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub metadata: BTreeMap<String, String>,
}

impl ObjectMetadata {
    /// The `commithash` entry, matched case-insensitively.
    pub fn commit_hash(&self) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(COMMIT_HASH_METADATA_KEY))
            .map(|(_, value)| value.as_str())
    }
}

/// Sorts versions oldest first by `last_modified` and numbers them from 1.
///
/// Versions with equal timestamps keep their relative input order.
pub fn order_versions(mut versions: Vec<ObjectVersion>) -> Vec<ObjectVersion> {
    versions.sort_by_key(|version| version.last_modified);
    for (index, version) in versions.iter_mut().enumerate() {
        version.version_number = index + 1;
    }
    versions
}

/// A template known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub name: String,
    pub kind: TemplateKind,
    pub display_name: String,
    pub description: String,
}

/// Parameters of a template to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTemplate {
    pub name: String,
    pub display_name: String,
    pub description: String,
}

/// Where a template version's bundle lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSource {
    pub bucket: String,
    pub key: String,
}

/// Request to register a new version of an existing template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRequest {
    pub template_name: String,
    pub description: String,
    /// `Some(m)` adds a minor version under major `m`; `None` starts a new major.
    pub major_version: Option<u64>,
    pub source: TemplateSource,
}

/// A registered template version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVersion {
    pub template_name: String,
    pub major: u64,
    pub minor: u64,
    pub description: String,
    pub source: TemplateSource,
}

impl fmt::Display for TemplateVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.template_name, self.major, self.minor)
    }
}

/// Versioned blob storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists every stored version of every object whose key starts with `prefix`.
    async fn list_object_versions(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectVersion>>;

    /// Reads the user metadata of the latest version of `key`.
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata>;

    /// Fetches the payload of one specific version.
    async fn get_object(&self, version: &ObjectVersion) -> Result<Vec<u8>>;

    /// Permanently deletes one specific version.
    async fn delete_object_version(&self, version: &ObjectVersion) -> Result<()>;
}

/// Registry of deployment templates and their versions.
#[async_trait]
pub trait TemplateRegistry: Send + Sync {
    /// Looks up a template. A missing template is `Ok(None)`, not an error.
    async fn get_template(&self, kind: TemplateKind, name: &str) -> Result<Option<TemplateRecord>>;

    async fn create_template(
        &self,
        kind: TemplateKind,
        template: &NewTemplate,
    ) -> Result<TemplateRecord>;

    async fn create_template_version(
        &self,
        kind: TemplateKind,
        request: &VersionRequest,
    ) -> Result<TemplateVersion>;
}
