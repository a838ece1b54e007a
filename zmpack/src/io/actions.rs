//! Execution of a stage's action list against an explicit working directory.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::types::{Action, Stage};
use crate::error::PackError;
use crate::io::process::CommandOutput;
use crate::io::shell::{DEFAULT_OUTPUT_LIMIT_BYTES, Shell, ShellRequest};
use crate::io::walker::{EntryKind, entry_kind, remove_tree_recursive};

/// Limits applied to every `command` action.
#[derive(Debug, Clone, Copy)]
pub struct CommandLimits {
    /// Kill a command after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Maximum bytes to capture from stdout/stderr.
    pub output_limit_bytes: usize,
}

impl Default for CommandLimits {
    fn default() -> Self {
        Self {
            timeout: None,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
        }
    }
}

/// Run `actions` in order with `workdir` as the base for relative paths and
/// as the cwd of every command.
///
/// Stops at the first fatal action; later actions are not attempted.
#[instrument(skip_all, fields(stage = %stage, workdir = %workdir.display(), actions = actions.len()))]
pub fn run_stage<S: Shell>(
    stage: Stage,
    actions: &[Action],
    workdir: &Path,
    shell: &S,
    limits: CommandLimits,
) -> Result<()> {
    for (index, action) in actions.iter().enumerate() {
        debug!(index, tag = action.tag(), "running action");
        match action {
            Action::Delete { item } => delete_item(stage, workdir, item)?,
            Action::Command { line } => run_shell_action(stage, workdir, line, shell, limits)?,
            Action::Unknown { tag } => {
                warn!(stage = %stage, tag = %tag, index, "unknown action tag, skipping");
            }
        }
    }
    Ok(())
}

/// Remove `item` below `workdir`. Missing items are a no-op.
pub fn delete_item(stage: Stage, workdir: &Path, item: &str) -> Result<()> {
    let path = workdir.join(item);
    match entry_kind(&path) {
        None => {
            debug!(stage = %stage, path = %path.display(), "delete target missing, nothing to do");
        }
        Some(EntryKind::File) => {
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
            info!(stage = %stage, path = %path.display(), "deleted file");
        }
        Some(EntryKind::Dir) => {
            remove_tree_recursive(&path)
                .with_context(|| format!("{stage}: delete {}", path.display()))?;
            info!(stage = %stage, path = %path.display(), "deleted directory");
        }
        Some(EntryKind::Other) => {
            warn!(
                stage = %stage,
                path = %path.display(),
                "delete target is neither file nor directory, leaving it"
            );
        }
    }
    Ok(())
}

fn run_shell_action<S: Shell>(
    stage: Stage,
    workdir: &Path,
    line: &str,
    shell: &S,
    limits: CommandLimits,
) -> Result<()> {
    info!(stage = %stage, command = %line, "running command");
    let request = ShellRequest {
        workdir: workdir.to_path_buf(),
        command_line: line.to_string(),
        timeout: limits.timeout,
        output_limit_bytes: limits.output_limit_bytes,
    };
    let output = shell.run(&request).map_err(|err| {
        err.context(PackError::ShellCommandFailure {
            stage,
            command: line.to_string(),
            exit_code: None,
            timed_out: false,
            stderr: String::new(),
        })
    })?;
    surface_output(stage, &output);

    if !output.success() {
        warn!(
            stage = %stage,
            command = %line,
            exit_code = ?output.status.code(),
            timed_out = output.timed_out,
            "command failed"
        );
        return Err(PackError::ShellCommandFailure {
            stage,
            command: line.to_string(),
            exit_code: output.status.code(),
            timed_out: output.timed_out,
            stderr: output.stderr_lossy(),
        }
        .into());
    }
    Ok(())
}

fn surface_output(stage: Stage, output: &CommandOutput) {
    for line in output.stdout_lossy().lines() {
        info!(stage = %stage, "stdout: {line}");
    }
    for line in output.stderr_lossy().lines() {
        warn!(stage = %stage, "stderr: {line}");
    }
}
