//! Helpers for rendering and checking relative paths.

use std::path::{Component, Path};

/// Render `relative` as a `/`-separated archive entry name.
///
/// Returns `None` for paths that are not plain relative paths (absolute,
/// prefixed, or containing `..`). `.` components are dropped.
pub fn entry_name(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// True if `path` stays below the directory it is joined onto.
pub fn is_contained_relative(path: &str) -> bool {
    entry_name(Path::new(path)).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_name_joins_with_forward_slashes() {
        assert_eq!(
            entry_name(&Path::new("sub").join("deep").join("b.txt")),
            Some("sub/deep/b.txt".to_string())
        );
        assert_eq!(entry_name(Path::new("./a.txt")), Some("a.txt".to_string()));
    }

    #[test]
    fn rejects_escaping_and_absolute_paths() {
        assert!(!is_contained_relative("../outside"));
        assert!(!is_contained_relative("a/../../b"));
        assert!(!is_contained_relative("/etc/passwd"));
        assert!(!is_contained_relative("."));
        assert!(is_contained_relative("src/main.rs"));
    }
}
