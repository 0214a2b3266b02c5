//! Spreadsheet file placement and atomic writes
//!
//! One `.xlsx` file per category per month, under a category-named directory.
//! Files are written via a same-directory temp file and rename, so a crash
//! mid-write never leaves a truncated spreadsheet that a later run would
//! mistake for a completed month.

use std::io::Write;
use std::path::Path;
use tracing::debug;

pub mod path;

pub use path::{category_dir, spreadsheet_path};

/// Errors producing output files
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Write spreadsheet bytes to `path` atomically, creating parent directories.
pub fn write_spreadsheet(path: &Path, bytes: &[u8]) -> OutputResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| {
        OutputError::IoError(format!(
            "Failed to create directory {}: {e}",
            parent.display()
        ))
    })?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| OutputError::IoError(format!("Failed to create temp file: {e}")))?;
    temp_file
        .write_all(bytes)
        .map_err(|e| OutputError::IoError(format!("Failed to write temp file: {e}")))?;
    temp_file
        .flush()
        .map_err(|e| OutputError::IoError(format!("Failed to flush temp file: {e}")))?;
    temp_file
        .persist(path)
        .map_err(|e| OutputError::IoError(format!("Failed to persist {}: {e}", path.display())))?;

    debug!(path = %path.display(), bytes = bytes.len(), "Spreadsheet written");
    Ok(())
}
