//! revmark-core — shared library for the revmark build-stamping toolkit.
//!
//! Provides:
//! - `marker` — the revision marker value type
//! - `exec` — external command execution seam (`CommandRunner`)
//! - `mock` — scripted command runner for tests
//! - `git` — short SHA lookup through the seam
//! - `cache` — the `.git_sha` fallback record
//! - `resolver` — the never-failing git → cache → sentinel chain
//! - `hook` — pre-build action registry and runner
//! - `report` — the `GIT_SHA=<marker>` stdout contract

pub mod cache;
pub mod exec;
pub mod git;
pub mod hook;
pub mod marker;
pub mod mock;
pub mod report;
pub mod resolver;

/// Version string for `--version` output: package version plus the revision
/// this toolkit itself was built from.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")");
