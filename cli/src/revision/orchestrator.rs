//! # tmplver Revision Orchestrator (`revision::orchestrator`)
//!
//! File: cli/src/revision/orchestrator.rs
//!
//! ## Overview
//!
//! `RevisionProcessor::process` handles one upload notification:
//!
//! 1. Make sure the configured template exists. If it does not, create it
//!    and stop; the next upload registers the first version.
//! 2. Decode the object key and list its stored versions, oldest first.
//! 3. Fetch the two newest payloads and compare their fingerprints.
//! 4. Identical fingerprints register a minor version under the highest
//!    version directory of the newer bundle; different fingerprints start a
//!    new major version. A newer bundle without any version directory is
//!    treated as a major change.
//! 5. Delete the oldest stored versions beyond the retention limit.
//!
//! Collaborators are held as `Arc<dyn ...>` handles created once by the caller.
//!
use crate::core::error::{FingerprintError, Result, TmplverError};
use crate::fingerprint::{self, ChangeKind, FingerprintResult};
use crate::revision::{
    decode_object_key, order_versions, NewTemplate, ObjectStore, ObjectVersion, TemplateKind,
    TemplateRecord, TemplateRegistry, TemplateSource, TemplateVersion, UploadEvent,
    VersionRequest,
};
use anyhow::Context;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of commit hash characters quoted in version descriptions.
const SHORT_COMMIT_LEN: usize = 7;

/// Template and retention settings of a processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorSettings {
    pub template_name: String,
    pub kind: TemplateKind,
    /// Stored versions kept after processing; `0` is raised to `1`.
    pub keep_versions: usize,
}

/// How the newest revision relates to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionDecision {
    pub change: ChangeKind,
    /// Major version to register under; `None` lets the registry start a new one.
    pub major_version: Option<u64>,
    /// Comparison result, absent when the newer bundle had no version directories.
    pub fingerprint: Option<FingerprintResult>,
}

impl RevisionDecision {
    fn from_fingerprint(result: FingerprintResult) -> Self {
        let change = result.change();
        let major_version = match change {
            ChangeKind::Minor => Some(result.highest_version_number),
            ChangeKind::Major => None,
        };
        Self {
            change,
            major_version,
            fingerprint: Some(result),
        }
    }

    fn without_versions() -> Self {
        Self {
            change: ChangeKind::Major,
            major_version: None,
            fingerprint: None,
        }
    }
}

/// Result of processing one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The template did not exist yet and was created; no version was registered.
    TemplateCreated { template: TemplateRecord },
    /// A new template version was registered.
    VersionRegistered {
        version: TemplateVersion,
        decision: RevisionDecision,
        /// Stored object versions deleted by retention, oldest first.
        pruned: Vec<ObjectVersion>,
    },
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessOutcome::TemplateCreated { template } => {
                write!(f, "Created {} template '{}'", template.kind, template.name)
            }
            ProcessOutcome::VersionRegistered {
                version,
                decision,
                pruned,
            } => write!(
                f,
                "Registered {} ({} change), pruned {} stored version(s)",
                version,
                decision.change,
                pruned.len()
            ),
        }
    }
}

/// Sequences retrieval, comparison, registration and retention for uploads.
pub struct RevisionProcessor {
    store: Arc<dyn ObjectStore>,
    registry: Arc<dyn TemplateRegistry>,
    settings: ProcessorSettings,
}

impl RevisionProcessor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        registry: Arc<dyn TemplateRegistry>,
        mut settings: ProcessorSettings,
    ) -> Self {
        if settings.keep_versions == 0 {
            warn!("keep_versions is 0; keeping the newest stored version");
            settings.keep_versions = 1;
        }
        Self {
            store,
            registry,
            settings,
        }
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    /// Processes one upload notification.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if:
    /// - A collaborator call fails.
    /// - The key is malformed (`InvalidObjectKey`) or has no stored versions
    ///   (`NoObjectVersions`).
    /// - A stored bundle cannot be decoded (`Fingerprint(Decode)`).
    pub async fn process(&self, event: &UploadEvent) -> Result<ProcessOutcome> {
        let kind = self.settings.kind;
        let template_name = self.settings.template_name.trim();
        info!(
            "Processing upload of '{}' in bucket '{}' for {} template '{}'",
            event.key, event.bucket, kind, template_name
        );

        let existing = self
            .registry
            .get_template(kind, template_name)
            .await
            .with_context(|| format!("Failed to look up template '{}'", template_name))?;
        if existing.filter(|t| t.name == template_name).is_none() {
            let template = self
                .registry
                .create_template(
                    kind,
                    &NewTemplate {
                        name: template_name.to_string(),
                        display_name: template_name.to_string(),
                        description: template_name.to_string(),
                    },
                )
                .await
                .with_context(|| format!("Failed to create template '{}'", template_name))?;
            info!("Created {} template '{}'", kind, template.name);
            return Ok(ProcessOutcome::TemplateCreated { template });
        }

        let key = decode_object_key(&event.key)?;
        let versions = self.stored_versions(&event.bucket, &key).await?;
        let metadata = self.store.head_object(&event.bucket, &key).await?;

        let decision = self.decide(&versions).await?;
        info!(
            "Change classified as {} (major version: {:?})",
            decision.change, decision.major_version
        );

        let commit = match metadata.commit_hash() {
            Some(hash) => hash.chars().take(SHORT_COMMIT_LEN).collect::<String>(),
            None => {
                warn!("Object '{}' carries no commit hash metadata", key);
                "unknown".to_string()
            }
        };
        let request = VersionRequest {
            template_name: template_name.to_string(),
            description: format!("Syncing Commit Hash - [{}]", commit),
            major_version: decision.major_version,
            source: TemplateSource {
                bucket: event.bucket.clone(),
                key: key.clone(),
            },
        };
        let version = self
            .registry
            .create_template_version(kind, &request)
            .await
            .with_context(|| format!("Failed to register a version of '{}'", template_name))?;
        info!("Registered template version {}", version);

        let pruned = self.prune(&versions).await?;

        Ok(ProcessOutcome::VersionRegistered {
            version,
            decision,
            pruned,
        })
    }

    /// Versions of exactly `key`, oldest first and numbered.
    async fn stored_versions(&self, bucket: &str, key: &str) -> Result<Vec<ObjectVersion>> {
        let listed = self
            .store
            .list_object_versions(bucket, key)
            .await
            .with_context(|| format!("Failed to list versions of '{}'", key))?;
        let listed_count = listed.len();
        let matching: Vec<ObjectVersion> = listed.into_iter().filter(|v| v.key == key).collect();
        if matching.len() != listed_count {
            debug!(
                "Ignored {} version(s) of other keys sharing the prefix '{}'",
                listed_count - matching.len(),
                key
            );
        }
        if matching.is_empty() {
            return Err(TmplverError::NoObjectVersions {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }
            .into());
        }

        let versions = order_versions(matching);
        debug!("Stored versions of '{}': {:?}", key, versions);
        Ok(versions)
    }

    /// Compares the two newest versions; the older one may be absent.
    async fn decide(&self, versions: &[ObjectVersion]) -> Result<RevisionDecision> {
        let (newer, rest) = versions
            .split_last()
            .ok_or_else(|| TmplverError::Storage("no versions to compare".to_string()))?;

        let older_payload = match rest.last() {
            Some(older) => Some(self.fetch(older).await?),
            None => {
                debug!("Only one stored version; comparing against an empty fingerprint");
                None
            }
        };
        let newer_payload = self.fetch(newer).await?;

        match fingerprint::compare_concurrent(older_payload, Some(newer_payload)).await {
            Ok(result) => Ok(RevisionDecision::from_fingerprint(result)),
            Err(FingerprintError::EmptySet) => {
                warn!(
                    "Version {} of '{}' has no version directories; registering a new major version",
                    newer.version_id, newer.key
                );
                Ok(RevisionDecision::without_versions())
            }
            Err(err) => Err(TmplverError::Fingerprint(err).into()),
        }
    }

    async fn fetch(&self, version: &ObjectVersion) -> Result<Vec<u8>> {
        self.store.get_object(version).await.with_context(|| {
            format!(
                "Failed to fetch version {} of '{}'",
                version.version_id, version.key
            )
        })
    }

    /// Deletes the oldest versions so that at most `keep_versions` remain.
    async fn prune(&self, versions: &[ObjectVersion]) -> Result<Vec<ObjectVersion>> {
        let keep = self.settings.keep_versions;
        if versions.len() <= keep {
            info!(
                "{} stored version(s), retention keeps {}; nothing to delete",
                versions.len(),
                keep
            );
            return Ok(Vec::new());
        }

        let surplus = &versions[..versions.len() - keep];
        for version in surplus {
            self.store
                .delete_object_version(version)
                .await
                .with_context(|| {
                    format!(
                        "Failed to delete version {} of '{}'",
                        version.version_id, version.key
                    )
                })?;
            info!(
                "Deleted stored version #{} ({}) of '{}'",
                version.version_number, version.version_id, version.key
            );
        }
        Ok(surplus.to_vec())
    }
}
