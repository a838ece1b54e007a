//! Ephemeral staging directory for one pack run.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::naming::staging_dir_name;
use crate::error::PackError;
use crate::io::walker::remove_tree_recursive;

/// Directory `{name}-{timestamp}` under a temp root.
///
/// Creation is exclusive: an existing path is a [`PackError::StagingCollision`]
/// (two runs of the same project within one second). Dropping the handle does
/// not delete anything; call [`StagingDir::remove`].
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    pub fn create(temp_root: &Path, name: &str, timestamp: &str) -> Result<Self> {
        let path = temp_root.join(staging_dir_name(name, timestamp));
        match fs::create_dir(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(PackError::StagingCollision { path }.into());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("create staging {}", path.display()));
            }
        }
        debug!(path = %path.display(), "created staging directory");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the directory and everything in it.
    pub fn remove(self) -> Result<PathBuf> {
        remove_tree_recursive(&self.path)
            .with_context(|| format!("remove staging {}", self.path.display()))?;
        info!(path = %self.path.display(), "removed staging directory");
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_remove() {
        let temp = tempfile::tempdir().expect("tempdir");
        let staging = StagingDir::create(temp.path(), "demo", "20260102030405").expect("create");
        assert_eq!(staging.path(), temp.path().join("demo-20260102030405"));
        fs::write(staging.path().join("a.txt"), "a").expect("write");

        let removed = staging.remove().expect("remove");
        assert!(!removed.exists());
    }

    #[test]
    fn existing_path_is_a_collision() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir(temp.path().join("demo-20260102030405")).expect("pre-create");

        let err = StagingDir::create(temp.path(), "demo", "20260102030405").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PackError>(),
            Some(PackError::StagingCollision { .. })
        ));
    }
}
