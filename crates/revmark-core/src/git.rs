//! Short SHA lookup via the `git` CLI.

use std::io;
use std::path::Path;

use crate::exec::{CommandRunner, CommandSpec};
use crate::marker::RevisionMarker;

/// Truncation length requested from `git rev-parse --short`.
///
/// Fixed at 7 so markers stay stable across git versions and repositories
/// with differing `core.abbrev` settings.
pub const SHORT_SHA_LEN: usize = 7;

/// Failure of one git query. Recovered by the resolver's fallback chain,
/// never propagated past it.
#[derive(Debug)]
pub enum QueryError {
    /// git could not be spawned (not installed, permission denied).
    Launch(io::Error),
    /// git ran but exited non-zero (typically: not a repository).
    Command { code: Option<i32>, stderr: String },
    /// git reported success but printed nothing usable.
    EmptyOutput,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::Launch(e) => write!(f, "git could not be run: {}", e),
            QueryError::Command { code, stderr } => {
                let stderr = stderr.trim();
                match code {
                    Some(code) if !stderr.is_empty() => {
                        write!(f, "git exited with {}: {}", code, stderr)
                    }
                    Some(code) => write!(f, "git exited with {}", code),
                    None => write!(f, "git was killed before exiting"),
                }
            }
            QueryError::EmptyOutput => write!(f, "git returned no output"),
        }
    }
}

impl std::error::Error for QueryError {}

/// Queries the short HEAD SHA (`git rev-parse --short=7 HEAD`) in
/// `project_dir`. One invocation, no retries.
pub fn short_head_sha(
    runner: &impl CommandRunner,
    project_dir: &Path,
) -> Result<RevisionMarker, QueryError> {
    let spec = CommandSpec::new("git")
        .arg("rev-parse")
        .arg(format!("--short={}", SHORT_SHA_LEN))
        .arg("HEAD")
        .current_dir(project_dir);

    let out = runner.output(&spec).map_err(QueryError::Launch)?;
    if !out.success() {
        return Err(QueryError::Command {
            code: out.code,
            stderr: out.stderr,
        });
    }
    RevisionMarker::from_raw(&out.stdout).ok_or(QueryError::EmptyOutput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;

    #[test]
    fn test_query_sends_exact_arguments() {
        let mut runner = MockRunner::new();
        runner.push_success("abc1234\n");

        short_head_sha(&runner, Path::new("/work/fw")).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "git");
        assert_eq!(calls[0].args, vec!["rev-parse", "--short=7", "HEAD"]);
        assert_eq!(calls[0].cwd.as_deref(), Some(Path::new("/work/fw")));
    }

    #[test]
    fn test_query_trims_output() {
        let mut runner = MockRunner::new();
        runner.push_success(" abc1234\n");

        let marker = short_head_sha(&runner, Path::new(".")).unwrap();
        assert_eq!(marker.as_str(), "abc1234");
    }

    #[test]
    fn test_query_not_a_repository() {
        let mut runner = MockRunner::new();
        runner.push_failure(128, "fatal: not a git repository\n");

        let err = short_head_sha(&runner, Path::new(".")).unwrap_err();
        match err {
            QueryError::Command { code, ref stderr } => {
                assert_eq!(code, Some(128));
                assert!(stderr.contains("not a git repository"));
            }
            other => panic!("expected Command error, got {:?}", other),
        }
        assert!(err.to_string().contains("128"));
    }

    #[test]
    fn test_query_git_missing() {
        let mut runner = MockRunner::new();
        runner.push_not_found();

        let err = short_head_sha(&runner, Path::new(".")).unwrap_err();
        assert!(matches!(err, QueryError::Launch(_)));
    }

    #[test]
    fn test_query_empty_output() {
        let mut runner = MockRunner::new();
        runner.push_success("\n");

        let err = short_head_sha(&runner, Path::new(".")).unwrap_err();
        assert!(matches!(err, QueryError::EmptyOutput));
    }
}
