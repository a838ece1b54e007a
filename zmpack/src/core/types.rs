//! Shared deterministic types for the packing pipeline.
//!
//! These types define stable contracts between the config loader, the action
//! runner, and the orchestrator. They do not touch the filesystem.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One of the six ordered pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    CopyBefore,
    Copy,
    CopyAfter,
    PackBefore,
    Pack,
    PackAfter,
}

impl Stage {
    /// All stages in execution order.
    pub const ORDER: [Stage; 6] = [
        Stage::CopyBefore,
        Stage::Copy,
        Stage::CopyAfter,
        Stage::PackBefore,
        Stage::Pack,
        Stage::PackAfter,
    ];

    /// Config key / log label for the stage.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::CopyBefore => "copyBefore",
            Stage::Copy => "copy",
            Stage::CopyAfter => "copyAfter",
            Stage::PackBefore => "packBefore",
            Stage::Pack => "pack",
            Stage::PackAfter => "packAfter",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single instruction inside an action stage.
///
/// Encoded in `zmpack.json` as an array tagged by its first element, e.g.
/// `["delete", "dist"]` or `["command", "npm run build"]`. Tags other than
/// `delete`/`command` decode to [`Action::Unknown`] and are skipped with a
/// warning at run time. Known tags with a malformed payload are rejected while
/// decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Value>", into = "Vec<Value>")]
pub enum Action {
    /// Remove a file or directory, resolved against the stage working directory.
    Delete { item: String },
    /// Run a command line through the platform shell.
    Command { line: String },
    /// Unrecognized tag, preserved for diagnostics.
    Unknown { tag: String },
}

impl Action {
    pub fn delete(item: impl Into<String>) -> Self {
        Action::Delete { item: item.into() }
    }

    pub fn command(line: impl Into<String>) -> Self {
        Action::Command { line: line.into() }
    }

    /// The tag this action is encoded with.
    pub fn tag(&self) -> &str {
        match self {
            Action::Delete { .. } => "delete",
            Action::Command { .. } => "command",
            Action::Unknown { tag } => tag,
        }
    }
}

impl TryFrom<Vec<Value>> for Action {
    type Error = String;

    fn try_from(raw: Vec<Value>) -> Result<Self, Self::Error> {
        let Some((head, args)) = raw.split_first() else {
            return Err("action must be a non-empty array".to_string());
        };
        let tag = head
            .as_str()
            .ok_or_else(|| format!("action tag must be a string, got {head}"))?;
        match tag {
            "delete" => single_string_arg(tag, args).map(|item| Action::Delete { item }),
            "command" => single_string_arg(tag, args).map(|line| Action::Command { line }),
            other => Ok(Action::Unknown {
                tag: other.to_string(),
            }),
        }
    }
}

impl From<Action> for Vec<Value> {
    fn from(action: Action) -> Self {
        match action {
            Action::Delete { item } => vec![Value::from("delete"), Value::from(item)],
            Action::Command { line } => vec![Value::from("command"), Value::from(line)],
            Action::Unknown { tag } => vec![Value::from(tag)],
        }
    }
}

fn single_string_arg(tag: &str, args: &[Value]) -> Result<String, String> {
    match args {
        [Value::String(arg)] if !arg.trim().is_empty() => Ok(arg.clone()),
        [Value::String(_)] => Err(format!("{tag} argument must be non-empty")),
        [other] => Err(format!("{tag} argument must be a string, got {other}")),
        _ => Err(format!(
            "{tag} expects exactly one argument, got {}",
            args.len()
        )),
    }
}
