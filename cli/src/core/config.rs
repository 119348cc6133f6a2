//! # tmplver Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module implements the configuration system for tmplver, handling
//! loading, merging, validation, and access to configuration data. Nothing is
//! read from global state at use sites: the loaded `Config` is passed into the
//! constructors of the local object store, the template registry and the
//! revision processor.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Command-line flags (applied through `ConfigOverrides`)
//! 2. Project-specific `.tmplver.toml` in the current directory or ancestors
//! 3. User-specific `<config dir>/tmplver/config.toml`
//! 4. Default values defined in the code
//!
//! ## Examples
//!
//! ```toml
//! [template]
//! name = "my-env-template"
//! kind = "environment"
//!
//! [storage]
//! root = "~/.local/share/tmplver/objects"
//! bucket = "templates"
//!
//! [registry]
//! path = "~/.local/share/tmplver/registry.toml"
//!
//! [retention]
//! keep_versions = 5
//! ```
//!
//! ```rust,no_run
//! use tmplver::core::config;
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = config::load_config()?;
//! println!("bucket: {}", cfg.storage.bucket);
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::{Result, TmplverError};
use crate::revision::TemplateKind;
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub template: TemplateConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

/// The template that uploaded bundles are registered under.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// Template name in the registry. Required by `tmplver process`.
    pub name: Option<String>,
    /// Environment or service template.
    #[serde(default)]
    pub kind: TemplateKind,
}

/// Location of the local versioned object store.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Root directory of the store (can use ~). Will be expanded.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Bucket that template bundles are uploaded to.
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

/// Location of the file-backed template registry.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Path of the registry TOML document (can use ~). Will be expanded.
    #[serde(default = "default_registry_path")]
    pub path: String,
}

/// How many stored object versions survive processing.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    #[serde(default = "default_keep_versions")]
    pub keep_versions: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            bucket: default_bucket(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: default_registry_path(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            keep_versions: default_keep_versions(),
        }
    }
}

fn default_storage_root() -> String {
    "~/.local/share/tmplver/objects".to_string()
}
fn default_bucket() -> String {
    "templates".to_string()
}
fn default_registry_path() -> String {
    "~/.local/share/tmplver/registry.toml".to_string()
}
fn default_keep_versions() -> usize {
    5
}

/// Command-line values that take precedence over the configuration files.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub template_name: Option<String>,
    pub template_kind: Option<TemplateKind>,
    pub storage_root: Option<PathBuf>,
    pub bucket: Option<String>,
    pub registry_path: Option<PathBuf>,
    pub keep_versions: Option<usize>,
}

impl ConfigOverrides {
    /// Applies the set values onto `config`, then expands and re-validates it.
    pub fn apply(self, config: &mut Config) -> Result<()> {
        if let Some(name) = self.template_name {
            config.template.name = Some(name);
        }
        if let Some(kind) = self.template_kind {
            config.template.kind = kind;
        }
        if let Some(root) = self.storage_root {
            config.storage.root = root.to_string_lossy().into_owned();
        }
        if let Some(bucket) = self.bucket {
            config.storage.bucket = bucket;
        }
        if let Some(path) = self.registry_path {
            config.registry.path = path.to_string_lossy().into_owned();
        }
        if let Some(keep) = self.keep_versions {
            config.retention.keep_versions = keep;
        }
        expand_config_paths(config);
        validate_config(config).context("Configuration validation failed")
    }
}

const PROJECT_CONFIG_FILENAME: &str = ".tmplver.toml";

/// Loads the user and project configuration files and merges them over the defaults.
pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "tmplver", "tmplver") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    if let Some(project_config_path) = find_project_config_path()? {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.tmplver.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

fn find_project_config_path() -> Result<Option<PathBuf>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let mut path: &Path = &current_dir;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Ok(Some(project_config));
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return Ok(None);
        }
        match path.parent() {
            Some(parent) => path = parent,
            None => break,
        }
    }
    Ok(None)
}

/// Reads and parses one TOML configuration file.
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let mut merged = Config::default();
    merged.template.name = project_cfg.template.name.or(user.template.name);
    merged.template.kind = if project_cfg.template.kind != TemplateKind::default() {
        project_cfg.template.kind
    } else {
        user.template.kind
    };
    merged.storage.root = if project_cfg.storage.root != default_storage_root() {
        project_cfg.storage.root
    } else {
        user.storage.root
    };
    merged.storage.bucket = if project_cfg.storage.bucket != default_bucket() {
        project_cfg.storage.bucket
    } else {
        user.storage.bucket
    };
    merged.registry.path = if project_cfg.registry.path != default_registry_path() {
        project_cfg.registry.path
    } else {
        user.registry.path
    };
    merged.retention.keep_versions =
        if project_cfg.retention.keep_versions != default_keep_versions() {
            project_cfg.retention.keep_versions
        } else {
            user.retention.keep_versions
        };
    merged
}

fn expand_config_paths(config: &mut Config) {
    config.storage.root = shellexpand::tilde(&config.storage.root).into_owned();
    config.registry.path = shellexpand::tilde(&config.registry.path).into_owned();
    debug!(
        "Expanded storage root: {}, registry path: {}",
        config.storage.root, config.registry.path
    );
}

fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating configuration...");
    if config.storage.bucket.trim().is_empty() {
        return Err(anyhow!(TmplverError::Config(
            "Storage bucket name cannot be empty.".to_string()
        )));
    }
    if config.retention.keep_versions == 0 {
        return Err(anyhow!(TmplverError::Config(
            "retention.keep_versions must be at least 1.".to_string()
        )));
    }
    if let Some(name) = &config.template.name {
        if name.trim().is_empty() {
            return Err(anyhow!(TmplverError::Config(
                "Template name cannot be blank.".to_string()
            )));
        }
    }
    let root = PathBuf::from(&config.storage.root);
    if root.exists() && !root.is_dir() {
        return Err(anyhow!(TmplverError::Config(format!(
            "Configured storage root '{}' exists but is not a directory.",
            root.display()
        ))));
    }
    let registry = PathBuf::from(&config.registry.path);
    if registry.is_dir() {
        return Err(anyhow!(TmplverError::Config(format!(
            "Configured registry path '{}' is a directory, expected a file.",
            registry.display()
        ))));
    }
    debug!("Configuration validation successful.");
    Ok(())
}
