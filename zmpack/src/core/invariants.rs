//! Semantic invariants not expressible via JSON Schema.

use std::collections::HashSet;

use crate::core::path::is_contained_relative;

/// Check config-level invariants:
/// - `name` is usable as a file name component
/// - every `files` entry is a relative path that stays inside the project root
pub fn validate_invariants(name: &str, files: &[String]) -> Vec<String> {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push("name must be non-empty".to_string());
    } else if name.contains(['/', '\\']) || name == "." || name == ".." {
        errors.push(format!("name '{name}' must be a plain file name"));
    }

    for (index, file) in files.iter().enumerate() {
        if !is_contained_relative(file) {
            errors.push(format!(
                "files[{index}]: '{file}' must be a relative path inside the project"
            ));
        }
    }

    errors
}

/// Entries listed more than once in `files`, in first-repeat order.
///
/// Repeats are harmless (the copy stage copies the same source twice) but
/// usually a config mistake.
pub fn duplicate_files(files: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for file in files {
        if !seen.insert(file.as_str()) && !duplicates.contains(&file.as_str()) {
            duplicates.push(file.as_str());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| (*item).to_string()).collect()
    }

    #[test]
    fn accepts_plain_config() {
        assert!(validate_invariants("demo", &files(&["a.txt", "sub", "src/lib.rs"])).is_empty());
    }

    #[test]
    fn reports_every_violation() {
        let errors = validate_invariants("bad/name", &files(&["../x", "a", "/abs"]));
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors.iter().any(|err| err.contains("plain file name")));
        assert!(errors.iter().any(|err| err.contains("files[0]")));
        assert!(errors.iter().any(|err| err.contains("files[2]")));
    }

    #[test]
    fn duplicates_are_reported_once_and_not_invalid() {
        let list = files(&["a", "b", "a", "a", "b"]);
        assert!(validate_invariants("demo", &list).is_empty());
        assert_eq!(duplicate_files(&list), vec!["a", "b"]);
    }
}
