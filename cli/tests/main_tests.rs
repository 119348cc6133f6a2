//! # tmplver CLI Main Integration Tests
//!
//! File: cli/tests/main_tests.rs
//!
//! ## Overview
//!
//! Top-level behavior of the `tmplver` binary: `--help`, `--version` and
//! argument errors.
//!

mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_help_flag_lists_commands() {
    tmplver_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("inspect")
                .and(predicate::str::contains("compare"))
                .and(predicate::str::contains("bundle"))
                .and(predicate::str::contains("upload"))
                .and(predicate::str::contains("process")),
        );
}

#[test]
fn test_version_flag() {
    tmplver_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_subcommand_fails() {
    tmplver_cmd().assert().failure();
}

#[test]
fn test_unknown_subcommand_fails() {
    tmplver_cmd()
        .arg("publish")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
