//! CLI tests for the `zmpack` binary.
//!
//! Spawns the binary and verifies exit codes and stdout for pack, init, and
//! validate.

use std::path::PathBuf;
use std::process::Command;

use zmpack::core::types::Action;
use zmpack::exit_codes;
use zmpack::test_support::TestProject;

fn zmpack(project: &TestProject) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_zmpack"));
    cmd.current_dir(project.root()).env("RUST_LOG", "warn");
    cmd
}

#[test]
fn pack_prints_archive_path_and_exits_ok() {
    let project = TestProject::new().expect("project");
    project.write_file("a.txt", "hi").expect("a.txt");
    project
        .write_config(&project.config("demo", &["a.txt"]))
        .expect("config");

    let output = zmpack(&project)
        .arg("pack")
        .arg("--temp-dir")
        .arg(project.temp_root())
        .output()
        .expect("zmpack pack");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let printed = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
    assert!(printed.starts_with(project.out_dir()));
    assert!(printed.is_file());
    let file_name = printed
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    assert!(file_name.starts_with("demo.") && file_name.ends_with(".zip"));
    assert!(project.temp_entries().expect("temp").is_empty());
}

#[test]
fn missing_config_exits_failed() {
    let project = TestProject::new().expect("project");

    let output = zmpack(&project).output().expect("zmpack");

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    assert!(String::from_utf8_lossy(&output.stderr).contains("config file not found"));
    assert!(output.stdout.is_empty());
}

#[cfg(unix)]
#[test]
fn failing_command_exits_failed() {
    let project = TestProject::new().expect("project");
    project.write_file("a.txt", "hi").expect("a.txt");
    let mut cfg = project.config("demo", &["a.txt"]);
    cfg.pack_before = vec![Action::command("exit 7")];
    project.write_config(&cfg).expect("config");

    let output = zmpack(&project)
        .arg("pack")
        .arg("--temp-dir")
        .arg(project.temp_root())
        .output()
        .expect("zmpack pack");

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    assert!(String::from_utf8_lossy(&output.stderr).contains("exit code 7"));
}

#[test]
fn init_then_validate() {
    let project = TestProject::new().expect("project");

    let init = zmpack(&project).arg("init").status().expect("zmpack init");
    assert_eq!(init.code(), Some(exit_codes::OK));
    assert!(project.root().join("zmpack.json").is_file());

    let again = zmpack(&project).arg("init").status().expect("zmpack init again");
    assert_eq!(again.code(), Some(exit_codes::FAILED));

    let validate = zmpack(&project)
        .arg("validate")
        .output()
        .expect("zmpack validate");
    assert_eq!(validate.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&validate.stdout).trim(),
        "valid: name=project files=0 actions=0"
    );
}
