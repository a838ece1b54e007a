//! Project packager.
//!
//! Reads `zmpack.json` from the project root, runs its action stages around a
//! copy of the selected files, and writes `{targetPath}/{name}.{timestamp}.zip`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use zmpack::core::types::Stage;
use zmpack::exit_codes;
use zmpack::io::config::{CONFIG_FILE_NAME, PackConfig, load_config, write_config};
use zmpack::io::shell::SystemShell;
use zmpack::logging;
use zmpack::pipeline::{PackRequest, run_pack};

#[derive(Parser)]
#[command(
    name = "zmpack",
    version,
    about = "Package a project directory into a timestamped zip archive"
)]
struct Cli {
    /// Project root (defaults to the current directory).
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Config file (defaults to `<root>/zmpack.json`).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run every stage and write the archive (default).
    Pack {
        /// Parent directory for the staging directory (defaults to the system temp dir).
        #[arg(long, value_name = "DIR")]
        temp_dir: Option<PathBuf>,

        /// Kill any `command` action running longer than this many seconds.
        #[arg(long, value_name = "SECS")]
        command_timeout: Option<u64>,
    },
    /// Write a starter `zmpack.json`.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Load and validate the config without running anything.
    Validate,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        error!("{:#}", err);
        std::process::exit(exit_codes::FAILED);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => std::path::absolute(&root)
            .with_context(|| format!("resolve root {}", root.display()))?,
        None => std::env::current_dir().context("read current directory")?,
    };
    let config_path = cli.config.unwrap_or_else(|| root.join(CONFIG_FILE_NAME));

    match cli.command.unwrap_or(Command::Pack {
        temp_dir: None,
        command_timeout: None,
    }) {
        Command::Pack {
            temp_dir,
            command_timeout,
        } => cmd_pack(root, &config_path, temp_dir, command_timeout),
        Command::Init { force } => cmd_init(&root, &config_path, force),
        Command::Validate => cmd_validate(&config_path),
    }
}

fn cmd_pack(
    root: PathBuf,
    config_path: &Path,
    temp_dir: Option<PathBuf>,
    command_timeout: Option<u64>,
) -> Result<()> {
    let cfg = load_config(config_path)?;
    let mut request = PackRequest::now(root);
    if let Some(temp_dir) = temp_dir {
        request.temp_root = temp_dir;
    }
    request.limits.timeout = command_timeout.map(Duration::from_secs);

    let outcome = run_pack(&request, &cfg, &SystemShell)?;
    info!(archive = %outcome.archive_path.display(), "archive ready");
    println!("{}", outcome.archive_path.display());
    Ok(())
}

fn cmd_init(root: &Path, config_path: &Path, force: bool) -> Result<()> {
    if !force && config_path.exists() {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    let name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "project".to_string());
    write_config(config_path, &PackConfig::starter(name))?;
    println!("{}", config_path.display());
    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<()> {
    let cfg = load_config(config_path)?;
    let actions: usize = Stage::ORDER
        .iter()
        .map(|stage| cfg.actions(*stage).len())
        .sum();
    println!(
        "valid: name={} files={} actions={}",
        cfg.name,
        cfg.files.len(),
        actions
    );
    Ok(())
}
