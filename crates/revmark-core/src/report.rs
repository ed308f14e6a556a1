//! Build-variable emission contract.
//!
//! The build tool captures the resolver's stdout, so the contract is a
//! single `GIT_SHA=<marker>` line with nothing else on that stream.

use crate::marker::RevisionMarker;

/// Key under which the marker is published, both on stdout and in hook
/// child environments.
pub const MARKER_KEY: &str = "GIT_SHA";

/// Formats the one-line stdout contract: `GIT_SHA=<marker>`.
pub fn env_line(marker: &RevisionMarker) -> String {
    format!("{}={}", MARKER_KEY, marker)
}
