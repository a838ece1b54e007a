//! Fatal error kinds raised by the pipeline.
//!
//! Orchestration code propagates these through `anyhow::Result` with added
//! context; callers that need to branch on the kind use `downcast_ref`.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::Stage;

#[derive(Error, Debug)]
pub enum PackError {
    /// Config file not found.
    #[error("config file not found: {}", path.display())]
    ConfigMissing { path: PathBuf },

    /// Config failed schema, decode, or semantic validation.
    #[error("invalid config {}: {}", path.display(), errors.join("; "))]
    ConfigInvalid { path: PathBuf, errors: Vec<String> },

    /// Strict recursive delete met something that is neither file nor directory.
    #[error("unsupported entry kind at {}", path.display())]
    UnsupportedEntryKind { path: PathBuf },

    /// A `command` action exited non-zero, timed out, or could not be spawned.
    #[error("{stage} command `{command}` failed ({})", describe_exit(*exit_code, *timed_out))]
    ShellCommandFailure {
        stage: Stage,
        command: String,
        exit_code: Option<i32>,
        timed_out: bool,
        stderr: String,
    },

    /// The staging directory for this run already exists.
    #[error("staging directory already exists: {}", path.display())]
    StagingCollision { path: PathBuf },

    /// ZIP archive error
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

fn describe_exit(exit_code: Option<i32>, timed_out: bool) -> String {
    match (timed_out, exit_code) {
        (true, _) => "timed out".to_string(),
        (false, Some(code)) => format!("exit code {code}"),
        (false, None) => "terminated by signal or not started".to_string(),
    }
}
