//! Scripted command runner for tests.
//!
//! `MockRunner` plays back queued results in order and records every
//! invocation, letting tests drive the resolver and hook through all their
//! failure paths without spawning real processes.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use crate::exec::{CommandOutput, CommandRunner, CommandSpec};

/// Result queued for one future invocation.
#[derive(Debug, Clone)]
enum Scripted {
    /// The command ran to completion with this output.
    Output(CommandOutput),
    /// Spawning failed, as when the binary is not installed.
    LaunchError(io::ErrorKind),
}

/// Command runner that plays back scripted results in FIFO order.
#[derive(Debug, Default)]
pub struct MockRunner {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl MockRunner {
    /// Creates a runner with an empty script. Running a command with no
    /// queued result fails with `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful run that prints `stdout`.
    pub fn push_success(&mut self, stdout: impl Into<String>) {
        self.push_output(CommandOutput {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        });
    }

    /// Queues a run that exits with `code`, printing `stderr`.
    pub fn push_failure(&mut self, code: i32, stderr: impl Into<String>) {
        self.push_output(CommandOutput {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        });
    }

    /// Queues a child that was killed before producing an exit code.
    pub fn push_killed(&mut self) {
        self.push_output(CommandOutput {
            code: None,
            stdout: String::new(),
            stderr: String::new(),
        });
    }

    /// Queues a spawn failure, as when the binary is not installed.
    pub fn push_not_found(&mut self) {
        self.script
            .get_mut()
            .unwrap()
            .push_back(Scripted::LaunchError(io::ErrorKind::NotFound));
    }

    fn push_output(&mut self, output: CommandOutput) {
        self.script
            .get_mut()
            .unwrap()
            .push_back(Scripted::Output(output));
    }

    /// Every spec the runner has been asked to execute, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::LaunchError(kind)) => {
                Err(io::Error::new(kind, format!("mock: cannot run {}", spec.program)))
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("mock: no scripted result for {}", spec.program),
            )),
        }
    }
}

impl CommandRunner for MockRunner {
    fn output(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        self.next(spec)
    }

    fn status(&self, spec: &CommandSpec) -> io::Result<Option<i32>> {
        self.next(spec).map(|out| out.code)
    }
}
