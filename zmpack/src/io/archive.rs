//! Zip a directory tree into a single archive.
//!
//! Entries are stored relative to the source directory, so its contents sit at
//! the archive root. Directories get their own entries so empty directories
//! survive a round trip.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::result::ZipError;
use zip::write::{FileOptions, ZipWriter};

use crate::core::path::entry_name;
use crate::error::PackError;

/// Deflate level used for archives; favours speed over ratio.
pub const FAST_COMPRESSION_LEVEL: i64 = 1;

/// What ended up in an archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub files: usize,
    pub dirs: usize,
    /// Entries that were neither file nor directory.
    pub skipped: usize,
    /// Size of the finished archive on disk.
    pub bytes: u64,
}

/// Write every entry below `source` into a new zip file at `target`.
///
/// Any failure is reported as [`PackError::Archive`]; a partially written
/// `target` may be left behind.
#[instrument(skip_all, fields(source = %source.display(), target = %target.display()))]
pub fn zip_directory(source: &Path, target: &Path) -> Result<ArchiveSummary> {
    let mut summary = write_archive(source, target)
        .map_err(PackError::Archive)
        .with_context(|| format!("archive {}", source.display()))?;
    summary.bytes = fs::metadata(target)
        .with_context(|| format!("stat {}", target.display()))?
        .len();

    info!(
        files = summary.files,
        dirs = summary.dirs,
        bytes = summary.bytes,
        "archive written"
    );
    Ok(summary)
}

fn write_archive(source: &Path, target: &Path) -> Result<ArchiveSummary, ZipError> {
    let file = File::create(target)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options: FileOptions<'_, ()> = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(FAST_COMPRESSION_LEVEL));

    let mut summary = ArchiveSummary::default();
    let walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        let Some(name) = entry_name(relative) else {
            warn!(path = %entry.path().display(), "skipping entry without a usable name");
            summary.skipped += 1;
            continue;
        };
        let file_type = entry.file_type();
        let entry_options = options.unix_permissions(permissions(&entry)?);

        if file_type.is_dir() {
            zip.add_directory(name.as_str(), entry_options)?;
            summary.dirs += 1;
        } else if file_type.is_file() {
            zip.start_file(name.as_str(), entry_options)?;
            let mut input = File::open(entry.path())?;
            io::copy(&mut input, &mut zip)?;
            summary.files += 1;
        } else {
            warn!(path = %entry.path().display(), "skipping entry that is neither file nor directory");
            summary.skipped += 1;
            continue;
        }
        debug!(entry = %name, "added entry");
    }

    zip.finish()?;
    Ok(summary)
}

#[cfg(unix)]
fn permissions(entry: &walkdir::DirEntry) -> io::Result<u32> {
    use std::os::unix::fs::PermissionsExt;
    Ok(entry.metadata().map_err(io::Error::from)?.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn permissions(entry: &walkdir::DirEntry) -> io::Result<u32> {
    Ok(if entry.file_type().is_dir() { 0o755 } else { 0o644 })
}
