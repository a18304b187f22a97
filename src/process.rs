//! External tool execution.
//!
//! Every stage shells out through a [`CommandRunner`]. The runner prints a
//! `==> program args` trace line, runs the tool with inherited stdio, and
//! hands back the exit status. [`CommandRunner::run`] is the checked form the
//! pipeline uses: a non-zero exit becomes a fatal error.

use crate::cli::OutputManager;
use crate::error::{CommandError, Result};
use path_absolutize::Absolutize;
use std::path::PathBuf;
use std::process::Stdio;

/// A single external tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Program name or path, as written in the trace line
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory for the process
    pub cwd: PathBuf,
}

impl ToolCommand {
    /// Create a command running in `cwd`
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program followed by space-joined arguments
    pub fn command_line(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }

    /// Trace line printed before the command runs
    pub fn trace_line(&self) -> String {
        format!("==> {}", self.command_line())
    }
}

/// Exit status of a finished command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutcome {
    /// Outcome of a process that exited with code zero
    pub fn succeeded() -> Self {
        Self { exit_code: Some(0) }
    }

    /// Whether the process exited with code zero
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Convert a non-zero exit into [`CommandError::ExecutionFailed`]
    pub fn ensure_success(self, command: &ToolCommand) -> Result<()> {
        if self.success() {
            Ok(())
        } else {
            Err(CommandError::ExecutionFailed {
                command: command.command_line(),
                exit_code: self.exit_code,
            }
            .into())
        }
    }
}

/// Runs external tools on behalf of the pipeline
pub trait CommandRunner {
    /// Run the command to completion and report how it exited.
    ///
    /// Only failures to locate or launch the program are errors here.
    fn execute(&self, command: &ToolCommand) -> Result<CommandOutcome>;

    /// Run the command and fail unless it exits with code zero
    fn run(&self, command: &ToolCommand) -> Result<()> {
        self.execute(command)?.ensure_success(command)
    }
}

/// Runner that spawns real processes with inherited stdio
#[derive(Debug, Clone)]
pub struct SystemRunner {
    output: OutputManager,
}

impl SystemRunner {
    /// Create a runner that traces through `output`
    pub fn new(output: OutputManager) -> Self {
        Self { output }
    }

    /// Resolve the program the way a shell would from `cwd`.
    ///
    /// The result is absolute: a relative `cwd` yields a path relative to
    /// this process, which the child would misread after `current_dir`.
    fn resolve(&self, command: &ToolCommand) -> Result<PathBuf> {
        let not_found = |reason: String| CommandError::NotFound {
            program: command.program.clone(),
            reason,
        };

        let path = std::env::var_os("PATH");
        let found = which::which_in(&command.program, path, &command.cwd)
            .map_err(|e| not_found(e.to_string()))?;
        let absolute = found
            .absolutize()
            .map_err(|e| not_found(e.to_string()))?
            .into_owned();
        Ok(absolute)
    }
}

impl CommandRunner for SystemRunner {
    fn execute(&self, command: &ToolCommand) -> Result<CommandOutcome> {
        self.output.trace(&command.trace_line());

        let program = self.resolve(command)?;
        log::debug!(
            "Resolved {} to {} (cwd {})",
            command.program,
            program.display(),
            command.cwd.display()
        );

        let status = std::process::Command::new(&program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| CommandError::LaunchFailed {
                command: command.command_line(),
                reason: e.to_string(),
            })?;

        log::debug!("{} exited with {}", command.program, status);

        Ok(CommandOutcome {
            exit_code: status.code(),
        })
    }
}
