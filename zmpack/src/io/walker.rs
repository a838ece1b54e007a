//! Recursive copy and delete primitives.
//!
//! Entry kinds are read without following symlinks: a symlink is neither a
//! file nor a directory. Copy warns and skips such entries at every depth;
//! delete refuses them with [`PackError::UnsupportedEntryKind`].

use std::fs;
use std::ops::AddAssign;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::error::PackError;

/// Kind of a filesystem entry, as far as the pipeline cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

impl From<fs::FileType> for EntryKind {
    fn from(file_type: fs::FileType) -> Self {
        if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::Other
        }
    }
}

/// Counts of entries touched by [`copy_tree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopySummary {
    pub files: usize,
    pub dirs: usize,
    pub skipped: usize,
}

impl AddAssign for CopySummary {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.dirs += other.dirs;
        self.skipped += other.skipped;
    }
}

/// True if anything exists at `path`, including dangling symlinks. Never errors.
pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Kind of the entry at `path`, or `None` if nothing is there.
pub fn entry_kind(path: &Path) -> Option<EntryKind> {
    fs::symlink_metadata(path)
        .ok()
        .map(|meta| EntryKind::from(meta.file_type()))
}

/// Mirror `source` into `target`.
///
/// `target` is created with a single-level create if missing. Files are
/// byte-copied over any existing file; directories recurse. Entries already in
/// `target` that have no counterpart in `source` are left alone.
pub fn copy_tree(source: &Path, target: &Path) -> Result<CopySummary> {
    let mut summary = CopySummary::default();
    if !exists(target) {
        fs::create_dir(target).with_context(|| format!("create {}", target.display()))?;
    }
    summary.dirs += 1;

    for entry in fs::read_dir(source).with_context(|| format!("read {}", source.display()))? {
        let entry = entry.with_context(|| format!("read entry in {}", source.display()))?;
        let from = entry.path();
        let to = target.join(entry.file_name());
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", from.display()))?;
        match EntryKind::from(file_type) {
            EntryKind::File => {
                fs::copy(&from, &to)
                    .with_context(|| format!("copy {} to {}", from.display(), to.display()))?;
                summary.files += 1;
            }
            EntryKind::Dir => summary += copy_tree(&from, &to)?,
            EntryKind::Other => {
                warn!(path = %from.display(), "skipping entry that is neither file nor directory");
                summary.skipped += 1;
            }
        }
    }

    debug!(
        source = %source.display(),
        target = %target.display(),
        files = summary.files,
        dirs = summary.dirs,
        "copied tree"
    );
    Ok(summary)
}

/// Delete every file and subdirectory below `path`, then `path` itself.
///
/// Fails with [`PackError::UnsupportedEntryKind`] on the first entry that is
/// neither file nor directory; entries removed before that stay removed.
pub fn remove_tree_recursive(path: &Path) -> Result<()> {
    for entry in fs::read_dir(path).with_context(|| format!("read {}", path.display()))? {
        let entry = entry.with_context(|| format!("read entry in {}", path.display()))?;
        let child = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", child.display()))?;
        match EntryKind::from(file_type) {
            EntryKind::File => {
                fs::remove_file(&child).with_context(|| format!("remove {}", child.display()))?;
            }
            EntryKind::Dir => remove_tree_recursive(&child)?,
            EntryKind::Other => {
                return Err(PackError::UnsupportedEntryKind { path: child }.into());
            }
        }
    }
    fs::remove_dir(path).with_context(|| format!("remove {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, contents).expect("write file");
    }

    #[test]
    fn exists_is_false_for_missing_paths() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(exists(temp.path()));
        assert!(!exists(&temp.path().join("nope")));
        assert_eq!(entry_kind(&temp.path().join("nope")), None);
        assert_eq!(entry_kind(temp.path()), Some(EntryKind::Dir));
    }

    #[test]
    fn copy_tree_mirrors_nested_entries() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("src");
        write(&source.join("a.txt"), "a");
        write(&source.join("deep/b.txt"), "b");
        fs::create_dir_all(source.join("empty")).expect("empty dir");
        let target = temp.path().join("dst");

        let summary = copy_tree(&source, &target).expect("copy");

        assert_eq!(fs::read_to_string(target.join("a.txt")).expect("a"), "a");
        assert_eq!(fs::read_to_string(target.join("deep/b.txt")).expect("b"), "b");
        assert!(target.join("empty").is_dir());
        assert_eq!(summary.files, 2);
        assert_eq!(summary.dirs, 3);
    }

    #[test]
    fn copy_tree_is_idempotent_and_cumulative() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("src");
        let target = temp.path().join("dst");
        write(&source.join("a.txt"), "one");
        write(&target.join("keep.txt"), "keep");

        copy_tree(&source, &target).expect("first copy");
        copy_tree(&source, &target).expect("second copy");
        assert_eq!(fs::read_to_string(target.join("a.txt")).expect("a"), "one");

        write(&source.join("a.txt"), "two");
        write(&source.join("new.txt"), "new");
        copy_tree(&source, &target).expect("third copy");

        assert_eq!(fs::read_to_string(target.join("a.txt")).expect("a"), "two");
        assert_eq!(fs::read_to_string(target.join("new.txt")).expect("new"), "new");
        assert_eq!(fs::read_to_string(target.join("keep.txt")).expect("keep"), "keep");
    }

    #[test]
    fn copy_tree_does_not_create_missing_ancestors() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("src");
        write(&source.join("a.txt"), "a");

        let err = copy_tree(&source, &temp.path().join("x/y/z")).unwrap_err();
        assert!(err.to_string().contains("create"));
    }

    #[test]
    fn remove_tree_recursive_leaves_siblings() {
        let temp = tempfile::tempdir().expect("tempdir");
        let doomed = temp.path().join("doomed");
        write(&doomed.join("a.txt"), "a");
        write(&doomed.join("deep/deeper/b.txt"), "b");
        write(&temp.path().join("sibling.txt"), "s");

        remove_tree_recursive(&doomed).expect("remove");

        assert!(!exists(&doomed));
        assert!(exists(&temp.path().join("sibling.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_skipped_on_copy_and_refused_on_delete() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("src");
        write(&source.join("real.txt"), "r");
        std::os::unix::fs::symlink(source.join("real.txt"), source.join("link.txt"))
            .expect("symlink");
        let target = temp.path().join("dst");

        let summary = copy_tree(&source, &target).expect("copy");
        assert_eq!(summary.skipped, 1);
        assert!(!exists(&target.join("link.txt")));

        let err = remove_tree_recursive(&source).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PackError>(),
            Some(PackError::UnsupportedEntryKind { .. })
        ));
    }
}
