//! Test-only helpers: a recording shell and a throwaway project fixture.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use crate::io::config::{CONFIG_FILE_NAME, PackConfig, write_config};
use crate::io::process::CommandOutput;
use crate::io::shell::{Shell, ShellRequest};
use crate::pipeline::PackRequest;

/// Shell that records every request and fabricates results without spawning.
#[derive(Default)]
pub struct RecordingShell {
    calls: RefCell<Vec<ShellRequest>>,
    fail_on: Option<(String, i32)>,
}

impl RecordingShell {
    /// Every command exits 0 with empty output.
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Commands equal to `command_line` exit with `code`; all others succeed.
    pub fn failing_on(command_line: &str, code: i32) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on: Some((command_line.to_string(), code)),
        }
    }

    /// Requests seen so far, in call order.
    pub fn calls(&self) -> Vec<ShellRequest> {
        self.calls.borrow().clone()
    }
}

impl Shell for RecordingShell {
    fn run(&self, request: &ShellRequest) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(request.clone());
        let code = match &self.fail_on {
            Some((line, code)) if *line == request.command_line => *code,
            _ => 0,
        };
        Ok(CommandOutput {
            status: exit_status(code),
            stdout: Vec::new(),
            stderr: Vec::new(),
            stdout_truncated: 0,
            stderr_truncated: 0,
            timed_out: false,
        })
    }
}

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// Fixed timestamp used by fixtures: 2026-01-02 03:04:05.
pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 2)
        .and_then(|date| date.and_hms_opt(3, 4, 5))
        .unwrap_or_default()
}

/// A project root, a private temp root, and an output directory, all under
/// one temporary directory that is removed on drop.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create tempdir")?;
        for sub in ["project", "tmp", "out"] {
            fs::create_dir(dir.path().join(sub)).with_context(|| format!("create {sub}"))?;
        }
        Ok(Self { dir })
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("project")
    }

    pub fn temp_root(&self) -> PathBuf {
        self.dir.path().join("tmp")
    }

    pub fn out_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    /// Write `contents` to `relative` under the project root, creating parents.
    pub fn write_file(&self, relative: &str, contents: &str) -> Result<()> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
    }

    /// Config named `name` writing to the fixture's output directory.
    pub fn config(&self, name: &str, files: &[&str]) -> PackConfig {
        let mut cfg = PackConfig::starter(name);
        cfg.target_path = self.out_dir().display().to_string();
        cfg.files = files.iter().map(|file| (*file).to_string()).collect();
        cfg
    }

    /// Write `cfg` to `zmpack.json` in the project root.
    pub fn write_config(&self, cfg: &PackConfig) -> Result<PathBuf> {
        let path = self.root().join(CONFIG_FILE_NAME);
        write_config(&path, cfg)?;
        Ok(path)
    }

    /// Pack request rooted in this fixture, stamped with [`fixed_time`].
    pub fn request(&self) -> PackRequest {
        PackRequest {
            project_root: self.root(),
            temp_root: self.temp_root(),
            started_at: fixed_time(),
            limits: Default::default(),
        }
    }

    /// Entries currently in the private temp root.
    pub fn temp_entries(&self) -> Result<Vec<String>> {
        list_names(&self.temp_root())
    }
}

fn list_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.context("read entry")?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
