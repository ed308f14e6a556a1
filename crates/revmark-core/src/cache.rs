//! Single-record fallback cache for the revision marker.
//!
//! The cache keeps resolution working in trees without version-control
//! metadata (source exports, release tarballs): the last successfully
//! resolved marker is written to `.git_sha` and read back when git is
//! unavailable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::marker::RevisionMarker;

/// Default cache file name, created in the project directory.
pub const CACHE_FILE_NAME: &str = ".git_sha";

/// The `.git_sha` single-record file.
#[derive(Debug, Clone)]
pub struct MarkerCache {
    path: PathBuf,
}

impl MarkerCache {
    /// Cache at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache at the default location inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(CACHE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached marker. Surrounding whitespace is tolerated and
    /// trimmed; an empty record is reported as `InvalidData`.
    pub fn load(&self) -> io::Result<RevisionMarker> {
        let content = fs::read_to_string(&self.path)?;
        RevisionMarker::from_raw(&content)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "cache record is empty"))
    }

    /// Writes the marker as the file's entire content, no trailing newline.
    ///
    /// The record goes to a `.tmp` sibling first and is renamed into place,
    /// so an interrupted write never leaves a partial record behind.
    pub fn store(&self, marker: &RevisionMarker) -> io::Result<()> {
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, marker.as_str())?;
        fs::rename(&tmp_path, &self.path)
    }

    /// `.tmp` sibling in the same directory, so the rename stays atomic.
    fn tmp_path(&self) -> PathBuf {
        let mut os = self.path.clone().into_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }
}
