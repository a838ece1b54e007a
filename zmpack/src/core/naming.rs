//! Deterministic names derived from the run timestamp.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Render the run timestamp: unpadded year, then two-digit month, day, hour,
/// minute and second, without separators.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    format!(
        "{}{:02}{:02}{:02}{:02}{:02}",
        at.year(),
        at.month(),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Directory name for the staging area: `{name}-{timestamp}`.
pub fn staging_dir_name(name: &str, timestamp: &str) -> String {
    format!("{name}-{timestamp}")
}

/// Archive file name: `{name}.{timestamp}.zip`.
pub fn archive_file_name(name: &str, timestamp: &str) -> String {
    format!("{name}.{timestamp}.zip")
}

/// Full archive path under `target_dir`.
pub fn archive_path(target_dir: &Path, name: &str, timestamp: &str) -> PathBuf {
    target_dir.join(archive_file_name(name, timestamp))
}
