//! Pre-build action registry and runner.
//!
//! Models the build tool's pre-build action list: external commands
//! registered in order and executed before the main build target, with the
//! exported environment entries visible to every child. The first failing
//! action stops the run and its exit status is forwarded unchanged, so the
//! surrounding build aborts exactly when the action asked it to.

use std::fmt;
use std::io;
use std::path::Path;

use tracing::info;

use crate::exec::{CommandRunner, CommandSpec};

/// Placeholder expanded to the project directory in action arguments.
pub const PROJECT_DIR_VAR: &str = "$PROJECT_DIR";

/// Exit code reported when an action's process cannot be started.
pub const LAUNCH_FAILURE_CODE: i32 = 127;

/// One registered pre-build action.
#[derive(Debug, Clone)]
pub struct PreBuildAction {
    /// Label used in diagnostics and errors.
    pub name: String,
    pub spec: CommandSpec,
}

impl PreBuildAction {
    pub fn new(name: impl Into<String>, spec: CommandSpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

/// A failed pre-build run. Unlike resolution failures this is fatal: the
/// caller forwards `exit_code()` so the build stops.
#[derive(Debug)]
pub enum HookError {
    /// The action's process could not be started.
    Launch { action: String, source: io::Error },
    /// The action exited non-zero, or was killed before exiting.
    Failed { action: String, code: Option<i32> },
}

impl HookError {
    /// Exit code to forward: the child's own code when it has one, 127 for
    /// launch failures, 1 for signal-killed children.
    pub fn exit_code(&self) -> i32 {
        match self {
            HookError::Launch { .. } => LAUNCH_FAILURE_CODE,
            HookError::Failed {
                code: Some(code), ..
            } => *code,
            HookError::Failed { code: None, .. } => 1,
        }
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookError::Launch { action, source } => {
                write!(f, "pre-build action '{}' could not start: {}", action, source)
            }
            HookError::Failed {
                action,
                code: Some(code),
            } => {
                write!(f, "pre-build action '{}' failed with exit code {}", action, code)
            }
            HookError::Failed { action, code: None } => {
                write!(f, "pre-build action '{}' was killed before exiting", action)
            }
        }
    }
}

impl std::error::Error for HookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HookError::Launch { source, .. } => Some(source),
            HookError::Failed { .. } => None,
        }
    }
}

/// Ordered collection of pre-build actions plus the environment entries
/// exported to each action's child process.
#[derive(Debug, Default)]
pub struct HookRegistry {
    actions: Vec<PreBuildAction>,
    exports: Vec<(String, String)>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action to run before the build target.
    pub fn add_pre_action(&mut self, action: PreBuildAction) {
        self.actions.push(action);
    }

    /// Exports `key=value` into the environment of every action's child.
    pub fn export_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.exports.push((key.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Runs every action in registration order with inherited stdio,
    /// stopping at the first failure.
    pub fn run_all(&self, runner: &impl CommandRunner) -> Result<(), HookError> {
        for action in &self.actions {
            self.run_action(runner, action)?;
        }
        Ok(())
    }

    fn run_action(
        &self,
        runner: &impl CommandRunner,
        action: &PreBuildAction,
    ) -> Result<(), HookError> {
        let mut spec = action.spec.clone();
        for (key, value) in &self.exports {
            spec = spec.env(key.clone(), value.clone());
        }

        info!("running pre-build action '{}'", action.name);
        info!("executing: {}", spec);

        let code = runner.status(&spec).map_err(|source| HookError::Launch {
            action: action.name.clone(),
            source,
        })?;
        match code {
            Some(0) => Ok(()),
            code => Err(HookError::Failed {
                action: action.name.clone(),
                code,
            }),
        }
    }
}

/// Expands the literal `$PROJECT_DIR` token in one argument.
pub fn expand_project_dir(arg: &str, project_dir: &Path) -> String {
    arg.replace(PROJECT_DIR_VAR, &project_dir.to_string_lossy())
}
