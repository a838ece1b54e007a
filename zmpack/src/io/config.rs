//! Pack configuration stored in `zmpack.json` at the project root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jsonschema::Draft;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::invariants::{duplicate_files, validate_invariants};
use crate::core::types::{Action, Stage};
use crate::error::PackError;

/// Default config file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "zmpack.json";

const V1_SCHEMA: &str = include_str!("../../../schemas/zmpack/v1.schema.json");

/// Pack configuration (JSON).
///
/// Loaded once per run and never mutated. Action lists are optional and
/// default to empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackConfig {
    /// Project name, used in the staging directory and archive file names.
    pub name: String,

    /// Directory the archive is written to. Relative paths resolve against the
    /// project root.
    pub target_path: String,

    #[serde(default)]
    pub copy_before: Vec<Action>,

    #[serde(default)]
    pub copy_after: Vec<Action>,

    /// Files and directories copied from the project root into staging.
    pub files: Vec<String>,

    #[serde(default)]
    pub pack_before: Vec<Action>,

    #[serde(default)]
    pub pack_after: Vec<Action>,
}

impl PackConfig {
    /// Starter config written by `zmpack init`.
    pub fn starter(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_path: "dist".to_string(),
            copy_before: Vec::new(),
            copy_after: Vec::new(),
            files: Vec::new(),
            pack_before: Vec::new(),
            pack_after: Vec::new(),
        }
    }

    /// Action list for an action stage. `Copy` and `Pack` carry none.
    pub fn actions(&self, stage: Stage) -> &[Action] {
        match stage {
            Stage::CopyBefore => self.copy_before.as_slice(),
            Stage::CopyAfter => self.copy_after.as_slice(),
            Stage::PackBefore => self.pack_before.as_slice(),
            Stage::PackAfter => self.pack_after.as_slice(),
            Stage::Copy | Stage::Pack => &[],
        }
    }

    /// Archive directory resolved against `project_root`.
    pub fn target_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.target_path)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = validate_invariants(&self.name, &self.files);
        if self.target_path.trim().is_empty() {
            errors.push("targetPath must be non-empty".to_string());
        }
        errors
    }
}

/// Load and validate config from a JSON file.
///
/// A missing file is [`PackError::ConfigMissing`]; schema, action-decode, and
/// semantic failures are collected into [`PackError::ConfigInvalid`].
pub fn load_config(path: &Path) -> Result<PackConfig> {
    if !path.exists() {
        return Err(PackError::ConfigMissing {
            path: path.to_path_buf(),
        }
        .into());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg = parse_config(&contents).map_err(|errors| PackError::ConfigInvalid {
        path: path.to_path_buf(),
        errors,
    })?;
    for file in duplicate_files(&cfg.files) {
        warn!(path = %path.display(), file, "files lists an entry more than once");
    }
    debug!(
        path = %path.display(),
        name = %cfg.name,
        files = cfg.files.len(),
        "config loaded"
    );
    Ok(cfg)
}

/// Parse config text, returning every violation found.
pub fn parse_config(contents: &str) -> std::result::Result<PackConfig, Vec<String>> {
    let json: Value =
        serde_json::from_str(contents).map_err(|err| vec![format!("parse json: {err}")])?;
    validate_schema(&json)?;
    let cfg: PackConfig =
        serde_json::from_value(json).map_err(|err| vec![format!("decode config: {err}")])?;
    let errors = cfg.validate();
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(cfg)
}

/// Serialize `cfg` to pretty-printed JSON with trailing newline.
pub fn write_config(path: &Path, cfg: &PackConfig) -> Result<()> {
    let mut payload = serde_json::to_string_pretty(cfg).context("serialize config json")?;
    payload.push('\n');
    fs::write(path, payload).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Validate JSON instance against the embedded config schema (Draft 2020-12).
fn validate_schema(instance: &Value) -> std::result::Result<(), Vec<String>> {
    let schema: Value = serde_json::from_str(V1_SCHEMA)
        .map_err(|err| vec![format!("parse embedded schema: {err}")])?;
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .map_err(|err| vec![format!("compile json schema: {err}")])?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        return Err(messages);
    }
    Ok(())
}
