//! # tmplver File Template Registry (`revision::registry`)
//!
//! File: cli/src/revision/registry.rs
//!
//! ## Overview
//!
//! A `TemplateRegistry` whose state is a single TOML document on disk. Each
//! call reads the document, applies its change and writes it back; a mutex
//! serializes calls made through the same handle.
//!
//! ## Version allocation
//!
//! - No major version requested: the next major (`1` for the first version)
//!   with minor `0`.
//! - Major `m` requested: the next minor within `m`, or `0` if `m` has no
//!   versions yet.
//!
//! ## Document format
//!
//! ```toml
//! [[templates]]
//! name = "env-template"
//! kind = "environment"
//! display_name = "env-template"
//! description = "env-template"
//!
//! [[templates.versions]]
//! major = 1
//! minor = 0
//! description = "Syncing Commit Hash - [abcdef0]"
//! created_at = "2026-01-01T00:00:00Z"
//!
//! [templates.versions.source]
//! bucket = "templates"
//! key = "env/bundle.tar.gz"
//! ```
//!
use crate::common::fs::io;
use crate::core::error::{Result, TmplverError};
use crate::revision::{
    NewTemplate, TemplateKind, TemplateRecord, TemplateRegistry, TemplateSource, TemplateVersion,
    VersionRequest,
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    templates: Vec<StoredTemplate>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredTemplate {
    name: String,
    kind: TemplateKind,
    display_name: String,
    description: String,
    #[serde(default)]
    versions: Vec<StoredVersion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredVersion {
    major: u64,
    minor: u64,
    description: String,
    created_at: DateTime<Utc>,
    source: TemplateSource,
}

impl StoredTemplate {
    fn record(&self) -> TemplateRecord {
        TemplateRecord {
            name: self.name.clone(),
            kind: self.kind,
            display_name: self.display_name.clone(),
            description: self.description.clone(),
        }
    }

    fn version(&self, stored: &StoredVersion) -> TemplateVersion {
        TemplateVersion {
            template_name: self.name.clone(),
            major: stored.major,
            minor: stored.minor,
            description: stored.description.clone(),
            source: stored.source.clone(),
        }
    }
}

/// Major and minor number for a new version.
fn allocate_version(existing: &[StoredVersion], major_version: Option<u64>) -> (u64, u64) {
    match major_version {
        Some(major) => {
            let minor = existing
                .iter()
                .filter(|v| v.major == major)
                .map(|v| v.minor + 1)
                .max()
                .unwrap_or(0);
            (major, minor)
        }
        None => {
            let major = existing.iter().map(|v| v.major).max().unwrap_or(0) + 1;
            (major, 0)
        }
    }
}

/// Template registry persisted as a TOML file.
#[derive(Debug)]
pub struct FileTemplateRegistry {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTemplateRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All versions of a template, in registration order.
    pub async fn list_versions(&self, kind: TemplateKind, name: &str) -> Result<Vec<TemplateVersion>> {
        let _guard = self.lock.lock().await;
        let document = self.load()?;
        let template = find(&document, kind, name).ok_or_else(|| {
            TmplverError::Registry(format!("{} template '{}' does not exist", kind, name))
        })?;
        Ok(template
            .versions
            .iter()
            .map(|v| template.version(v))
            .collect())
    }

    fn load(&self) -> Result<RegistryDocument> {
        if !self.path.exists() {
            debug!("Registry file {:?} does not exist yet", self.path);
            return Ok(RegistryDocument::default());
        }
        let text = io::read_file_to_string(&self.path)?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse registry file {:?}", self.path))
    }

    fn save(&self, document: &RegistryDocument) -> Result<()> {
        let text = toml::to_string(document).context("Failed to serialize registry document")?;
        io::write_string_to_file(&self.path, &text)
    }
}

fn find<'a>(document: &'a RegistryDocument, kind: TemplateKind, name: &str) -> Option<&'a StoredTemplate> {
    document
        .templates
        .iter()
        .find(|t| t.kind == kind && t.name == name)
}

#[async_trait]
impl TemplateRegistry for FileTemplateRegistry {
    async fn get_template(&self, kind: TemplateKind, name: &str) -> Result<Option<TemplateRecord>> {
        let _guard = self.lock.lock().await;
        let document = self.load()?;
        Ok(find(&document, kind, name).map(StoredTemplate::record))
    }

    async fn create_template(
        &self,
        kind: TemplateKind,
        template: &NewTemplate,
    ) -> Result<TemplateRecord> {
        let _guard = self.lock.lock().await;
        let mut document = self.load()?;
        if find(&document, kind, &template.name).is_some() {
            return Err(TmplverError::Registry(format!(
                "{} template '{}' already exists",
                kind, template.name
            ))
            .into());
        }

        let stored = StoredTemplate {
            name: template.name.clone(),
            kind,
            display_name: template.display_name.clone(),
            description: template.description.clone(),
            versions: Vec::new(),
        };
        let record = stored.record();
        document.templates.push(stored);
        self.save(&document)?;
        info!("Registry: created {} template '{}'", kind, record.name);
        Ok(record)
    }

    async fn create_template_version(
        &self,
        kind: TemplateKind,
        request: &VersionRequest,
    ) -> Result<TemplateVersion> {
        let _guard = self.lock.lock().await;
        let mut document = self.load()?;
        let template = document
            .templates
            .iter_mut()
            .find(|t| t.kind == kind && t.name == request.template_name)
            .ok_or_else(|| {
                TmplverError::Registry(format!(
                    "{} template '{}' does not exist",
                    kind, request.template_name
                ))
            })?;

        let (major, minor) = allocate_version(&template.versions, request.major_version);
        let stored = StoredVersion {
            major,
            minor,
            description: request.description.clone(),
            created_at: Utc::now(),
            source: request.source.clone(),
        };
        let version = template.version(&stored);
        template.versions.push(stored);
        self.save(&document)?;
        info!("Registry: registered {}", version);
        Ok(version)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn stored(major: u64, minor: u64) -> StoredVersion {
        StoredVersion {
            major,
            minor,
            description: String::new(),
            created_at: Utc::now(),
            source: TemplateSource {
                bucket: "b".into(),
                key: "k".into(),
            },
        }
    }

    fn request(major_version: Option<u64>) -> VersionRequest {
        VersionRequest {
            template_name: "env-template".into(),
            description: "Syncing Commit Hash - [abcdef0]".into(),
            major_version,
            source: TemplateSource {
                bucket: "templates".into(),
                key: "env/bundle.tar.gz".into(),
            },
        }
    }

    fn new_template(name: &str) -> NewTemplate {
        NewTemplate {
            name: name.into(),
            display_name: name.into(),
            description: name.into(),
        }
    }

    #[test]
    fn test_allocate_version() {
        assert_eq!(allocate_version(&[], None), (1, 0));
        assert_eq!(allocate_version(&[], Some(3)), (3, 0));

        let existing = vec![stored(1, 0), stored(1, 1), stored(2, 0)];
        assert_eq!(allocate_version(&existing, None), (3, 0));
        assert_eq!(allocate_version(&existing, Some(1)), (1, 2));
        assert_eq!(allocate_version(&existing, Some(2)), (2, 1));
    }

    #[tokio::test]
    async fn test_missing_file_has_no_templates() -> Result<()> {
        let temp_dir = tempdir()?;
        let registry = FileTemplateRegistry::new(temp_dir.path().join("registry.toml"));
        assert!(registry
            .get_template(TemplateKind::Environment, "env-template")
            .await?
            .is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_register_versions_persist() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("state/registry.toml");
        let registry = FileTemplateRegistry::new(&path);

        registry
            .create_template(TemplateKind::Environment, &new_template("env-template"))
            .await?;
        let first = registry
            .create_template_version(TemplateKind::Environment, &request(None))
            .await?;
        let minor = registry
            .create_template_version(TemplateKind::Environment, &request(Some(1)))
            .await?;
        let major = registry
            .create_template_version(TemplateKind::Environment, &request(None))
            .await?;
        assert_eq!((first.major, first.minor), (1, 0));
        assert_eq!((minor.major, minor.minor), (1, 1));
        assert_eq!((major.major, major.minor), (2, 0));
        assert_eq!(major.to_string(), "env-template 2.0");

        // A fresh handle sees the persisted state.
        let reopened = FileTemplateRegistry::new(&path);
        let versions = reopened
            .list_versions(TemplateKind::Environment, "env-template")
            .await?;
        assert_eq!(versions.len(), 3);
        assert_eq!(versions[1].description, "Syncing Commit Hash - [abcdef0]");
        assert_eq!(versions[1].source.key, "env/bundle.tar.gz");
        Ok(())
    }

    #[tokio::test]
    async fn test_kinds_are_separate_namespaces() -> Result<()> {
        let temp_dir = tempdir()?;
        let registry = FileTemplateRegistry::new(temp_dir.path().join("registry.toml"));
        registry
            .create_template(TemplateKind::Service, &new_template("shared"))
            .await?;

        assert!(registry
            .get_template(TemplateKind::Environment, "shared")
            .await?
            .is_none());
        assert!(registry
            .create_template(TemplateKind::Environment, &new_template("shared"))
            .await
            .is_ok());
        assert!(registry
            .create_template(TemplateKind::Service, &new_template("shared"))
            .await
            .is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_version_for_unknown_template_fails() -> Result<()> {
        let temp_dir = tempdir()?;
        let registry = FileTemplateRegistry::new(temp_dir.path().join("registry.toml"));
        let err = registry
            .create_template_version(TemplateKind::Environment, &request(None))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        Ok(())
    }
}
