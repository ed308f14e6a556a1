//! External command execution seam.
//!
//! The `CommandRunner` trait separates the toolkit from real process
//! spawning, so resolution and hook behavior can be driven by scripted
//! results in tests (`mock::MockRunner`) and by `std::process` in the
//! binaries (`SystemRunner`).

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Command;

/// Description of one external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; inherited from the parent when `None`.
    pub cwd: Option<PathBuf>,
    /// Extra environment entries set for the child process.
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Abstraction over process execution.
pub trait CommandRunner {
    /// Runs the command to completion, capturing stdout and stderr.
    fn output(&self, spec: &CommandSpec) -> io::Result<CommandOutput>;

    /// Runs the command with inherited stdio, returning its exit code
    /// (`None` when the process was killed by a signal).
    fn status(&self, spec: &CommandSpec) -> io::Result<Option<i32>>;
}

/// Real process runner delegating to `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

fn build_command(spec: &CommandSpec) -> Command {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);
    if let Some(dir) = &spec.cwd {
        cmd.current_dir(dir);
    }
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }
    cmd
}

impl CommandRunner for SystemRunner {
    fn output(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        let out = build_command(spec).output()?;
        Ok(CommandOutput {
            code: out.status.code(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }

    fn status(&self, spec: &CommandSpec) -> io::Result<Option<i32>> {
        let status = build_command(spec).status()?;
        Ok(status.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_display_renders_command_line() {
        let spec = CommandSpec::new("python3").arg("$PROJECT_DIR/pre_build.py");
        assert_eq!(spec.to_string(), "python3 $PROJECT_DIR/pre_build.py");
    }

    #[test]
    fn test_spec_builder_accumulates() {
        let spec = CommandSpec::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir("/tmp")
            .env("GIT_SHA", "abc1234");
        assert_eq!(spec.args, vec!["rev-parse", "HEAD"]);
        assert_eq!(spec.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(spec.env, vec![("GIT_SHA".to_string(), "abc1234".to_string())]);
    }

    #[test]
    fn test_system_runner_missing_program() {
        let runner = SystemRunner::new();
        let spec = CommandSpec::new("revmark-test-no-such-program-12345");
        let err = runner.output(&spec).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_stdout() {
        let runner = SystemRunner::new();
        let spec = CommandSpec::new("echo").arg("hello");
        let out = runner.output(&spec).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_code() {
        let runner = SystemRunner::new();
        let spec = CommandSpec::new("sh").arg("-c").arg("exit 3");
        let out = runner.output(&spec).unwrap();
        assert!(!out.success());
        assert_eq!(out.code, Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_passes_env() {
        let runner = SystemRunner::new();
        let spec = CommandSpec::new("sh")
            .arg("-c")
            .arg("printf %s \"$REVMARK_TEST_ENV\"")
            .env("REVMARK_TEST_ENV", "abc1234");
        let out = runner.output(&spec).unwrap();
        assert_eq!(out.stdout, "abc1234");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_respects_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let expected = dir.path().canonicalize().unwrap();

        let runner = SystemRunner::new();
        let spec = CommandSpec::new("pwd").current_dir(dir.path());
        let out = runner.output(&spec).unwrap();
        assert_eq!(PathBuf::from(out.stdout.trim()), expected);
    }
}
