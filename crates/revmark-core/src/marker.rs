//! Revision marker value type.

use std::fmt;

/// Sentinel marker used when no revision can be resolved from git or from
/// the cache record.
pub const FALLBACK_MARKER: &str = "unknown";

/// Short textual identifier of the current source-control revision,
/// typically 7 hex characters.
///
/// Always non-empty and trimmed. When nothing can be resolved the marker
/// holds the `"unknown"` sentinel rather than being absent, so a build is
/// never stamped with an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionMarker(String);

impl RevisionMarker {
    /// Builds a marker from raw tool output, trimming surrounding
    /// whitespace and newlines. Returns `None` if nothing remains.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The `"unknown"` sentinel marker.
    pub fn fallback() -> Self {
        Self(FALLBACK_MARKER.to_string())
    }

    /// Whether this marker is the sentinel.
    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_MARKER
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
