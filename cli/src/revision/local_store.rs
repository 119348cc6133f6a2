//! # tmplver Local Object Store (`revision::local_store`)
//!
//! File: cli/src/revision/local_store.rs
//!
//! ## Overview
//!
//! A versioned object store kept in a plain directory tree, implementing the
//! `ObjectStore` trait. It backs the `upload` and `process` commands when no
//! remote storage service is involved.
//!
//! ## Layout
//!
//! ```text
//! <root>/<bucket>/<key>/<version_id>.blob        payload
//! <root>/<bucket>/<key>/<version_id>.meta.toml   last-modified time and user metadata
//! ```
//!
//! Version ids are zero-padded sequence numbers, unique per key. Keys may
//! contain `/` but no empty, `.` or `..` segments.
//!
use crate::common::fs::io;
use crate::core::error::{Result, TmplverError};
use crate::revision::{ObjectMetadata, ObjectStore, ObjectVersion};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

const BLOB_SUFFIX: &str = ".blob";
const META_SUFFIX: &str = ".meta.toml";

/// Sidecar written next to every payload.
#[derive(Debug, Serialize, Deserialize)]
struct VersionMeta {
    last_modified: DateTime<Utc>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

/// Filesystem-backed versioned object store.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores a new version of `key`, stamped with the current time.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: &[u8],
        metadata: BTreeMap<String, String>,
    ) -> Result<ObjectVersion> {
        self.put_object_at(bucket, key, payload, metadata, Utc::now())
            .await
    }

    /// Stores a new version of `key` with an explicit modification time.
    pub async fn put_object_at(
        &self,
        bucket: &str,
        key: &str,
        payload: &[u8],
        metadata: BTreeMap<String, String>,
        last_modified: DateTime<Utc>,
    ) -> Result<ObjectVersion> {
        let dir = self.object_dir(bucket, key)?;
        io::ensure_dir_exists(&dir)?;
        let version_id = next_version_id(&dir)?;

        io::write_bytes_to_file(&dir.join(format!("{}{}", version_id, BLOB_SUFFIX)), payload)?;
        let meta = VersionMeta {
            last_modified,
            metadata,
        };
        let meta_text = toml::to_string(&meta).context("Failed to serialize object metadata")?;
        io::write_string_to_file(&dir.join(format!("{}{}", version_id, META_SUFFIX)), &meta_text)?;

        info!(
            "Stored version {} of '{}' in bucket '{}' ({} bytes)",
            version_id,
            key,
            bucket,
            payload.len()
        );
        Ok(ObjectVersion {
            bucket: bucket.to_string(),
            key: key.to_string(),
            version_id,
            last_modified,
            version_number: 0,
        })
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        if bucket.is_empty() || bucket.contains('/') || bucket == "." || bucket == ".." {
            return Err(TmplverError::Storage(format!("Invalid bucket name '{}'", bucket)).into());
        }
        Ok(self.root.join(bucket))
    }

    fn object_dir(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .split('/')
                .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
        if !valid {
            return Err(TmplverError::Storage(format!("Invalid object key '{}'", key)).into());
        }
        Ok(self.bucket_dir(bucket)?.join(key))
    }

    fn version_paths(&self, version: &ObjectVersion) -> Result<(PathBuf, PathBuf)> {
        let dir = self.object_dir(&version.bucket, &version.key)?;
        Ok((
            dir.join(format!("{}{}", version.version_id, BLOB_SUFFIX)),
            dir.join(format!("{}{}", version.version_id, META_SUFFIX)),
        ))
    }

    fn not_found(version: &ObjectVersion) -> anyhow::Error {
        TmplverError::ObjectNotFound {
            bucket: version.bucket.clone(),
            key: format!("{}@{}", version.key, version.version_id),
        }
        .into()
    }
}

fn read_meta(path: &Path) -> Result<VersionMeta> {
    let text = io::read_file_to_string(path)?;
    toml::from_str(&text).with_context(|| format!("Failed to parse object metadata {:?}", path))
}

/// One past the highest numeric version id present in `dir`.
fn next_version_id(dir: &Path) -> Result<String> {
    let mut highest = 0u64;
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory {:?}", dir))? {
        let entry = entry.with_context(|| format!("Failed to read directory {:?}", dir))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(id) = name.strip_suffix(META_SUFFIX) {
            if let Ok(number) = id.parse::<u64>() {
                highest = highest.max(number);
            }
        }
    }
    Ok(format!("{:08}", highest + 1))
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn list_object_versions(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectVersion>> {
        let bucket_dir = self.bucket_dir(bucket)?;
        if !bucket_dir.is_dir() {
            debug!("Bucket directory {:?} does not exist", bucket_dir);
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        for entry in WalkDir::new(&bucket_dir).min_depth(2) {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", bucket_dir))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            let Some(version_id) = name.strip_suffix(META_SUFFIX) else {
                continue;
            };
            let Some(parent) = entry.path().parent() else {
                continue;
            };
            let key = parent
                .strip_prefix(&bucket_dir)
                .with_context(|| format!("Unexpected path {:?} in bucket", entry.path()))?
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            if !key.starts_with(prefix) {
                continue;
            }

            let meta = read_meta(entry.path())?;
            versions.push(ObjectVersion {
                bucket: bucket.to_string(),
                key,
                version_id: version_id.to_string(),
                last_modified: meta.last_modified,
                version_number: 0,
            });
        }

        versions.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.version_id.cmp(&b.version_id)));
        debug!(
            "Listed {} version(s) under prefix '{}' in bucket '{}'",
            versions.len(),
            prefix,
            bucket
        );
        Ok(versions)
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        let latest = self
            .list_object_versions(bucket, key)
            .await?
            .into_iter()
            .filter(|v| v.key == key)
            .max_by(|a, b| {
                a.last_modified
                    .cmp(&b.last_modified)
                    .then_with(|| a.version_id.cmp(&b.version_id))
            })
            .ok_or_else(|| TmplverError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })?;

        let (_, meta_path) = self.version_paths(&latest)?;
        let meta = read_meta(&meta_path)?;
        Ok(ObjectMetadata {
            metadata: meta.metadata,
        })
    }

    async fn get_object(&self, version: &ObjectVersion) -> Result<Vec<u8>> {
        let (blob_path, _) = self.version_paths(version)?;
        if !blob_path.is_file() {
            return Err(Self::not_found(version));
        }
        io::read_file_bytes(&blob_path)
    }

    async fn delete_object_version(&self, version: &ObjectVersion) -> Result<()> {
        let (blob_path, meta_path) = self.version_paths(version)?;
        if !meta_path.is_file() {
            return Err(Self::not_found(version));
        }
        fs::remove_file(&meta_path)
            .with_context(|| format!("Failed to delete {:?}", meta_path))?;
        if blob_path.exists() {
            fs::remove_file(&blob_path)
                .with_context(|| format!("Failed to delete {:?}", blob_path))?;
        }
        debug!(
            "Deleted version {} of '{}' in bucket '{}'",
            version.version_id, version.key, version.bucket
        );
        Ok(())
    }
}
