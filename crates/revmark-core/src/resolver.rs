//! Never-failing revision resolution.
//!
//! The chain is: query git, fall back to the `.git_sha` record, fall back
//! to the `"unknown"` sentinel. Every failure along the way is logged and
//! recovered; callers always receive a usable marker. The only side effect
//! is the best-effort cache write after a successful query, so later
//! resolutions survive the repository going away.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cache::MarkerCache;
use crate::exec::CommandRunner;
use crate::git;
use crate::marker::RevisionMarker;

/// Where a resolved marker came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSource {
    /// Fresh from `git rev-parse`.
    Repository,
    /// Read back from the `.git_sha` record.
    CacheFile,
    /// The `"unknown"` sentinel.
    Fallback,
}

impl fmt::Display for MarkerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MarkerSource::Repository => "git",
            MarkerSource::CacheFile => "cache",
            MarkerSource::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

/// Outcome of one resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub marker: RevisionMarker,
    pub source: MarkerSource,
}

/// Resolves the build revision marker for a project directory.
pub struct Resolver<R: CommandRunner> {
    runner: R,
    project_dir: PathBuf,
    cache: MarkerCache,
}

impl<R: CommandRunner> Resolver<R> {
    /// Resolver for the current directory, cache at `./.git_sha`.
    pub fn new(runner: R) -> Self {
        Self::with_project_dir(runner, Path::new("."))
    }

    /// Resolver rooted at `project_dir`: git runs there and the cache
    /// record lives there.
    pub fn with_project_dir(runner: R, project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let cache = MarkerCache::in_dir(&project_dir);
        Self {
            runner,
            project_dir,
            cache,
        }
    }

    /// Overrides the cache file location.
    pub fn with_cache(mut self, cache: MarkerCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &MarkerCache {
        &self.cache
    }

    /// Resolves the marker: git, then the cache record, then the sentinel.
    /// Never fails.
    pub fn resolve(&self) -> Resolution {
        match git::short_head_sha(&self.runner, &self.project_dir) {
            Ok(marker) => {
                debug!("resolved {} from git", marker);
                if let Err(e) = self.cache.store(&marker) {
                    warn!("failed to write {}: {}", self.cache.path().display(), e);
                }
                Resolution {
                    marker,
                    source: MarkerSource::Repository,
                }
            }
            Err(e) => {
                warn!("git query failed: {}", e);
                self.resolve_from_cache()
            }
        }
    }

    fn resolve_from_cache(&self) -> Resolution {
        match self.cache.load() {
            Ok(marker) => {
                debug!(
                    "using cached marker {} from {}",
                    marker,
                    self.cache.path().display()
                );
                Resolution {
                    marker,
                    source: MarkerSource::CacheFile,
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no cache record at {}", self.cache.path().display());
                Resolution {
                    marker: RevisionMarker::fallback(),
                    source: MarkerSource::Fallback,
                }
            }
            Err(e) => {
                warn!("failed to read {}: {}", self.cache.path().display(), e);
                Resolution {
                    marker: RevisionMarker::fallback(),
                    source: MarkerSource::Fallback,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_from_git_writes_cache() {
        let dir = tempdir().unwrap();
        let mut runner = MockRunner::new();
        runner.push_success("abc1234\n");

        let resolver = Resolver::with_project_dir(runner, dir.path());
        let resolution = resolver.resolve();

        assert_eq!(resolution.marker.as_str(), "abc1234");
        assert_eq!(resolution.source, MarkerSource::Repository);

        // Side effect: the cache record now holds exactly the marker.
        let raw = fs::read_to_string(dir.path().join(".git_sha")).unwrap();
        assert_eq!(raw, "abc1234");
    }

    #[test]
    fn test_resolve_falls_back_to_cache() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".git_sha"), "deadbee").unwrap();

        let mut runner = MockRunner::new();
        runner.push_failure(128, "fatal: not a git repository\n");

        let resolver = Resolver::with_project_dir(runner, dir.path());
        let resolution = resolver.resolve();

        assert_eq!(resolution.marker.as_str(), "deadbee");
        assert_eq!(resolution.source, MarkerSource::CacheFile);
    }

    #[test]
    fn test_resolve_falls_back_to_sentinel() {
        let dir = tempdir().unwrap();
        let mut runner = MockRunner::new();
        runner.push_not_found();

        let resolver = Resolver::with_project_dir(runner, dir.path());
        let resolution = resolver.resolve();

        assert_eq!(resolution.marker.as_str(), "unknown");
        assert_eq!(resolution.source, MarkerSource::Fallback);
    }

    #[test]
    fn test_resolve_empty_git_output_falls_back() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".git_sha"), "deadbee").unwrap();

        let mut runner = MockRunner::new();
        runner.push_success("\n");

        let resolver = Resolver::with_project_dir(runner, dir.path());
        let resolution = resolver.resolve();

        assert_eq!(resolution.marker.as_str(), "deadbee");
        assert_eq!(resolution.source, MarkerSource::CacheFile);
    }

    #[test]
    fn test_resolve_twice_is_stable() {
        let dir = tempdir().unwrap();
        let mut runner = MockRunner::new();
        runner.push_success("abc1234\n");
        runner.push_success("abc1234\n");

        let resolver = Resolver::with_project_dir(runner, dir.path());
        let first = resolver.resolve();
        let second = resolver.resolve();

        assert_eq!(first.marker, second.marker);
        assert_eq!(first.source, second.source);
    }

    #[test]
    fn test_resolve_survives_cache_write_failure() {
        let dir = tempdir().unwrap();
        let mut runner = MockRunner::new();
        runner.push_success("abc1234\n");

        // Cache path inside a directory that does not exist: the write
        // fails, the resolution must not.
        let cache = MarkerCache::new(dir.path().join("missing/.git_sha"));
        let resolver = Resolver::with_project_dir(runner, dir.path()).with_cache(cache);
        let resolution = resolver.resolve();

        assert_eq!(resolution.marker.as_str(), "abc1234");
        assert_eq!(resolution.source, MarkerSource::Repository);
    }

    #[test]
    fn test_resolve_unreadable_cache_falls_back_to_sentinel() {
        let dir = tempdir().unwrap();
        // A directory where the record should be: load fails with
        // something other than NotFound.
        fs::create_dir(dir.path().join(".git_sha")).unwrap();

        let mut runner = MockRunner::new();
        runner.push_failure(128, "fatal: not a git repository\n");

        let resolver = Resolver::with_project_dir(runner, dir.path());
        let resolution = resolver.resolve();

        assert_eq!(resolution.marker.as_str(), "unknown");
        assert_eq!(resolution.source, MarkerSource::Fallback);
    }

    #[test]
    fn test_marker_is_never_empty() {
        for scenario in ["success", "failure-cached", "failure-bare", "missing-git"] {
            let dir = tempdir().unwrap();
            let mut runner = MockRunner::new();
            match scenario {
                "success" => runner.push_success("abc1234\n"),
                "failure-cached" => {
                    fs::write(dir.path().join(".git_sha"), "deadbee").unwrap();
                    runner.push_failure(128, "fatal: not a git repository\n");
                }
                "failure-bare" => runner.push_failure(128, "fatal: not a git repository\n"),
                _ => runner.push_not_found(),
            }

            let resolver = Resolver::with_project_dir(runner, dir.path());
            let resolution = resolver.resolve();
            assert!(
                !resolution.marker.as_str().is_empty(),
                "empty marker in scenario {}",
                scenario
            );
        }
    }
}
