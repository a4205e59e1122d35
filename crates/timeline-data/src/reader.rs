//! Log file discovery and loading.
//!
//! Finds meter logs in a directory and reads a single log into memory as a
//! list of lines for the extractors.

use std::path::{Path, PathBuf};

use timeline_core::error::{Result, TimelineError};
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Find regular files directly inside `dir` whose name ends with `suffix`.
///
/// The scan is not recursive. Results are ordered by file name.
pub fn find_log_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TimelineError::NotADirectory(dir.to_path_buf()));
    }

    let files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), err);
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .map(|name| name.ends_with(suffix))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    debug!(
        "Found {} '{}' files in {}",
        files.len(),
        suffix,
        dir.display()
    );
    Ok(files)
}

/// Read every line of the log at `path`.
///
/// A missing file is reported as [`TimelineError::FileNotFound`]. Bytes that
/// are not valid UTF-8 are replaced rather than rejected, since meter logs
/// are captured from serial consoles and often contain line noise.
pub fn read_log_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|e| TimelineError::from_open(path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<String> = text.lines().map(str::to_owned).collect();
    debug!("Read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

/// File name component of `path` as a display string.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
