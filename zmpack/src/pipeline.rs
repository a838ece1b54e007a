//! Orchestration of one pack run.
//!
//! A run walks six stages in fixed order:
//!
//! 1. `copyBefore`: actions against the project root
//! 2. `copy`: selected files/dirs copied into a fresh staging directory
//! 3. `copyAfter`: actions against the project root
//! 4. `packBefore`: actions against the staging directory
//! 5. `pack`: staging directory zipped into `{targetPath}/{name}.{timestamp}.zip`
//! 6. `packAfter`: actions against the staging directory
//!
//! and finally removes the staging directory. Every stage receives its working
//! directory explicitly; the process cwd is never changed. The first fatal
//! error ends the run and leaves the staging directory on disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, instrument, warn};

use crate::core::naming::{archive_path, format_timestamp};
use crate::core::types::Stage;
use crate::io::actions::{CommandLimits, run_stage};
use crate::io::archive::{ArchiveSummary, zip_directory};
use crate::io::config::PackConfig;
use crate::io::shell::Shell;
use crate::io::staging::StagingDir;
use crate::io::walker::{CopySummary, EntryKind, copy_tree, entry_kind};

/// Inputs for a run that are not part of `zmpack.json`.
#[derive(Debug, Clone)]
pub struct PackRequest {
    /// Directory the config lives in; base for `files`, `copy*` actions, and a
    /// relative `targetPath`.
    pub project_root: PathBuf,
    /// Parent of the staging directory.
    pub temp_root: PathBuf,
    /// Wall-clock start of the run; drives the timestamp.
    pub started_at: NaiveDateTime,
    pub limits: CommandLimits,
}

impl PackRequest {
    /// Request stamped with the current local time and the system temp dir.
    pub fn now(project_root: PathBuf) -> Self {
        Self {
            project_root,
            temp_root: std::env::temp_dir(),
            started_at: Local::now().naive_local(),
            limits: CommandLimits::default(),
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOutcome {
    pub archive_path: PathBuf,
    /// Where the (now removed) staging directory was.
    pub staging_path: PathBuf,
    pub timestamp: String,
    pub copied: CopySummary,
    pub archive: ArchiveSummary,
}

/// Run every stage of `config` and return the archive location.
#[instrument(skip_all, fields(name = %config.name, root = %request.project_root.display()))]
pub fn run_pack<S: Shell>(
    request: &PackRequest,
    config: &PackConfig,
    shell: &S,
) -> Result<PackOutcome> {
    let timestamp = format_timestamp(request.started_at);
    let root = request.project_root.as_path();
    let target_dir = config.target_dir(root);
    let archive = archive_path(&target_dir, &config.name, &timestamp);
    info!(timestamp = %timestamp, archive = %archive.display(), "starting pack");

    run_action_stage(Stage::CopyBefore, config, root, shell, request.limits)?;

    let staging = StagingDir::create(&request.temp_root, &config.name, &timestamp)?;
    let staged = run_staged_stages(
        request,
        config,
        shell,
        &staging,
        &target_dir,
        &archive,
    );
    let (copied, archive_summary) = match staged {
        Ok(done) => done,
        Err(err) => {
            warn!(
                staging = %staging.path().display(),
                "run failed, staging directory left in place"
            );
            return Err(err);
        }
    };

    let staging_path = staging.remove()?;
    info!(archive = %archive.display(), bytes = archive_summary.bytes, "pack complete");
    Ok(PackOutcome {
        archive_path: archive,
        staging_path,
        timestamp,
        copied,
        archive: archive_summary,
    })
}

fn run_staged_stages<S: Shell>(
    request: &PackRequest,
    config: &PackConfig,
    shell: &S,
    staging: &StagingDir,
    target_dir: &Path,
    archive: &Path,
) -> Result<(CopySummary, ArchiveSummary)> {
    let root = request.project_root.as_path();

    let copied = copy_selected(root, &config.files, staging.path())
        .with_context(|| format!("{} stage", Stage::Copy))?;
    run_action_stage(Stage::CopyAfter, config, root, shell, request.limits)?;
    run_action_stage(Stage::PackBefore, config, staging.path(), shell, request.limits)?;

    if !target_dir.exists() {
        debug!(path = %target_dir.display(), "creating target directory");
        fs::create_dir_all(target_dir)
            .with_context(|| format!("create target {}", target_dir.display()))?;
    }
    let archive_summary = zip_directory(staging.path(), archive)
        .with_context(|| format!("{} stage", Stage::Pack))?;

    run_action_stage(Stage::PackAfter, config, staging.path(), shell, request.limits)?;
    Ok((copied, archive_summary))
}

fn run_action_stage<S: Shell>(
    stage: Stage,
    config: &PackConfig,
    workdir: &Path,
    shell: &S,
    limits: CommandLimits,
) -> Result<()> {
    let actions = config.actions(stage);
    if actions.is_empty() {
        debug!(stage = %stage, "no actions");
        return Ok(());
    }
    run_stage(stage, actions, workdir, shell, limits)
}

/// Copy each of `files` from `root` into `staging`, keeping relative paths.
///
/// Missing sources and sources that are neither file nor directory are
/// warned about and skipped.
#[instrument(skip_all, fields(count = files.len()))]
pub fn copy_selected(root: &Path, files: &[String], staging: &Path) -> Result<CopySummary> {
    let mut summary = CopySummary::default();
    for file in files {
        let source = root.join(file);
        let target = staging.join(file);
        match entry_kind(&source) {
            None => {
                warn!(stage = %Stage::Copy, path = %source.display(), "source missing, skipping");
                summary.skipped += 1;
                continue;
            }
            Some(EntryKind::Other) => {
                warn!(
                    stage = %Stage::Copy,
                    path = %source.display(),
                    "source is neither file nor directory, skipping"
                );
                summary.skipped += 1;
                continue;
            }
            Some(kind) => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("create {}", parent.display()))?;
                }
                if kind == EntryKind::File {
                    fs::copy(&source, &target).with_context(|| {
                        format!("copy {} to {}", source.display(), target.display())
                    })?;
                    summary.files += 1;
                } else {
                    summary += copy_tree(&source, &target)?;
                }
            }
        }
        debug!(item = %file, "copied");
    }
    info!(
        files = summary.files,
        dirs = summary.dirs,
        skipped = summary.skipped,
        "copy stage finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Action;
    use crate::test_support::{RecordingShell, TestProject};

    #[test]
    fn action_stages_get_their_working_directories() {
        let project = TestProject::new().expect("project");
        project.write_file("a.txt", "hi").expect("write");
        let mut cfg = project.config("demo", &["a.txt"]);
        cfg.copy_before = vec![Action::command("cb")];
        cfg.copy_after = vec![Action::command("ca")];
        cfg.pack_before = vec![Action::command("pb")];
        cfg.pack_after = vec![Action::command("pa")];
        let shell = RecordingShell::succeeding();

        let outcome = run_pack(&project.request(), &cfg, &shell).expect("pack");

        let calls = shell.calls();
        let seen: Vec<(&str, &Path)> = calls
            .iter()
            .map(|call| (call.command_line.as_str(), call.workdir.as_path()))
            .collect();
        let root = project.root();
        assert_eq!(
            seen,
            vec![
                ("cb", root.as_path()),
                ("ca", root.as_path()),
                ("pb", outcome.staging_path.as_path()),
                ("pa", outcome.staging_path.as_path()),
            ]
        );
    }

    #[test]
    fn outcome_names_archive_from_timestamp() {
        let project = TestProject::new().expect("project");
        project.write_file("a.txt", "hi").expect("write");
        let cfg = project.config("demo", &["a.txt"]);

        let outcome =
            run_pack(&project.request(), &cfg, &RecordingShell::succeeding()).expect("pack");

        assert_eq!(outcome.timestamp, "20260102030405");
        assert_eq!(
            outcome.archive_path,
            project.out_dir().join("demo.20260102030405.zip")
        );
        assert_eq!(
            outcome.staging_path,
            project.temp_root().join("demo-20260102030405")
        );
        assert!(outcome.archive_path.is_file());
        assert!(!outcome.staging_path.exists());
    }

    #[test]
    fn failure_skips_later_stages_and_keeps_staging() {
        let project = TestProject::new().expect("project");
        project.write_file("a.txt", "hi").expect("write");
        let mut cfg = project.config("demo", &["a.txt"]);
        cfg.copy_after = vec![Action::command("fail")];
        cfg.pack_before = vec![Action::command("never")];
        let shell = RecordingShell::failing_on("fail", 1);

        run_pack(&project.request(), &cfg, &shell).unwrap_err();

        assert_eq!(shell.calls().len(), 1);
        assert_eq!(project.temp_entries().expect("temp"), vec!["demo-20260102030405"]);
        assert!(std::fs::read_dir(project.out_dir()).expect("out").next().is_none());
    }

    #[test]
    fn copy_selected_keeps_nested_relative_paths() {
        let project = TestProject::new().expect("project");
        project.write_file("src/main.rs", "fn main() {}").expect("write");
        let staging = project.temp_root().join("stage");
        std::fs::create_dir(&staging).expect("stage");

        let files = ["src/main.rs".to_string(), "gone".to_string()];
        let summary = copy_selected(&project.root(), &files, &staging).expect("copy");

        assert_eq!(summary.files, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(
            std::fs::read_to_string(staging.join("src/main.rs")).expect("read"),
            "fn main() {}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn copy_selected_skips_top_level_symlink() {
        let project = TestProject::new().expect("project");
        project.write_file("a.txt", "hi").expect("write");
        std::os::unix::fs::symlink("a.txt", project.root().join("link")).expect("symlink");
        let staging = project.temp_root().join("stage");
        std::fs::create_dir(&staging).expect("stage");

        let files = ["a.txt".to_string(), "link".to_string()];
        let summary = copy_selected(&project.root(), &files, &staging).expect("copy");

        assert_eq!(summary.files, 1);
        assert_eq!(summary.skipped, 1);
        assert!(staging.join("a.txt").is_file());
        assert!(std::fs::symlink_metadata(staging.join("link")).is_err());
    }
}
