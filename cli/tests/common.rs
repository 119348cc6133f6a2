//! # tmplver CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration test crates in `cli/tests/`: locating
//! the `tmplver` binary, building bundle fixtures and setting up an isolated
//! workspace whose `.tmplver.toml` points storage and registry into a temp
//! directory.
//!

// Each test crate uses a different subset of these helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tmplver::common::archive::tar::{build_archive, ArchiveEntry};

/// Command for the compiled `tmplver` binary.
pub fn tmplver_cmd() -> Command {
    Command::cargo_bin("tmplver").expect("Failed to find tmplver binary for testing")
}

/// Bundle whose entries are the given directories, in order.
pub fn bundle_with_dirs(dirs: &[&str]) -> Vec<u8> {
    let entries: Vec<ArchiveEntry<'_>> = dirs.iter().map(|d| ArchiveEntry::Directory(*d)).collect();
    build_archive(&entries).expect("Failed to build fixture archive")
}

/// A temp directory acting as the project root for `tmplver` runs.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    /// Creates the workspace with a `.tmplver.toml` naming `template` and
    /// keeping `keep_versions` stored revisions.
    pub fn new(template: &str, keep_versions: usize) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp workspace");
        fs::create_dir(dir.path().join(".git")).expect("Failed to create .git marker");
        fs::create_dir(dir.path().join("home")).expect("Failed to create fake home");
        let config = format!(
            "[template]\nname = \"{}\"\n\n[storage]\nroot = \"{}\"\nbucket = \"templates\"\n\n\
             [registry]\npath = \"{}\"\n\n[retention]\nkeep_versions = {}\n",
            template,
            dir.path().join("objects").display(),
            dir.path().join("registry.toml").display(),
            keep_versions
        );
        fs::write(dir.path().join(".tmplver.toml"), config).expect("Failed to write config");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a bundle fixture into the workspace and returns its path.
    pub fn write_bundle(&self, file_name: &str, dirs: &[&str]) -> PathBuf {
        let path = self.path().join(file_name);
        fs::write(&path, bundle_with_dirs(dirs)).expect("Failed to write bundle fixture");
        path
    }

    /// `tmplver` command running inside the workspace with no user config.
    pub fn cmd(&self) -> Command {
        let mut cmd = tmplver_cmd();
        cmd.current_dir(self.path())
            .env("HOME", self.path().join("home"))
            .env("XDG_CONFIG_HOME", self.path().join("home/.config"))
            .env_remove("TMPLVER_TEMPLATE")
            .env_remove("TMPLVER_BUCKET")
            .env_remove("TMPLVER_KEEP_VERSIONS")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn registry_text(&self) -> String {
        fs::read_to_string(self.path().join("registry.toml")).unwrap_or_default()
    }
}
