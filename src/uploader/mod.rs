//! Upload sink for mirroring completed files
//!
//! A completed spreadsheet is handed off here after local progress is
//! recorded; upload failures are reported but never roll back a download.
//! The shipped [`MirrorSink`] copies into a drive-synced folder (the sync
//! agent owns the actual cloud transfer); other backends implement
//! [`UploadSink`] behind the same contract.

use crate::{output, Category, Period};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Errors uploading a completed file
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
}

/// Destination for completed category/period spreadsheets.
///
/// Implementations must be idempotent: re-uploading the same category/period
/// overwrites rather than duplicates.
#[async_trait]
pub trait UploadSink: Send + Sync {
    /// Upload the file at `local_path` as `category`'s spreadsheet for
    /// `period`.
    async fn upload(
        &self,
        local_path: &Path,
        category: &Category,
        period: Period,
    ) -> Result<(), UploadError>;
}

/// Mirrors completed files into a second directory tree with the same
/// category/file layout as the local output.
pub struct MirrorSink {
    root: PathBuf,
}

impl MirrorSink {
    /// Mirror into `root` (typically a cloud-synced folder).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl UploadSink for MirrorSink {
    async fn upload(
        &self,
        local_path: &Path,
        category: &Category,
        period: Period,
    ) -> Result<(), UploadError> {
        let dest = output::spreadsheet_path(&self.root, category, period);
        let parent = dest.parent().unwrap_or_else(|| Path::new("."));

        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            UploadError::IoError(format!(
                "Failed to create mirror directory {}: {e}",
                parent.display()
            ))
        })?;

        debug!(from = %local_path.display(), to = %dest.display(), "Mirroring spreadsheet");
        // copy truncates an existing destination, which is the overwrite
        // semantics re-uploads need
        tokio::fs::copy(local_path, &dest).await.map_err(|e| {
            UploadError::IoError(format!("Failed to mirror to {}: {e}", dest.display()))
        })?;

        info!(category = category.id(), period = %period, "Mirrored to drive folder");
        Ok(())
    }
}
