//! Shell abstraction for `command` actions.
//!
//! The [`Shell`] trait decouples the action runner from process spawning so
//! tests can record or script command results. [`SystemShell`] runs the line
//! through `sh -c` (or `cmd /C` on Windows).

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::io::process::{CommandOutput, run_command};

pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 1_000_000;

/// Parameters for one shell invocation.
#[derive(Debug, Clone)]
pub struct ShellRequest {
    /// Working directory for the child process.
    pub workdir: PathBuf,
    /// Command line handed verbatim to the shell.
    pub command_line: String,
    /// Kill the command after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Truncate captured stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

pub trait Shell {
    fn run(&self, request: &ShellRequest) -> Result<CommandOutput>;
}

/// Shell backed by the platform command interpreter.
pub struct SystemShell;

impl Shell for SystemShell {
    #[instrument(skip_all, fields(workdir = %request.workdir.display()))]
    fn run(&self, request: &ShellRequest) -> Result<CommandOutput> {
        debug!(command = %request.command_line, "running shell command");
        let mut cmd = shell_command(&request.command_line);
        cmd.current_dir(&request.workdir);
        run_command(cmd, request.timeout, request.output_limit_bytes)
            .with_context(|| format!("run `{}`", request.command_line))
    }
}

#[cfg(unix)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}
