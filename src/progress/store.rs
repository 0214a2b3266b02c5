//! Progress store persistence
//!
//! Implements atomic file writes so a crash mid-save never corrupts the
//! previous state, and schema versioning so format changes fail loudly
//! instead of silently misreading old files.

use crate::Period;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Current progress store schema version
const SCHEMA_VERSION: &str = "1.0.0";

/// Per-category download progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Newest period whose spreadsheet completed, or `None` before the
    /// category's first success.
    last_completed: Option<Period>,
    /// Unix timestamp (milliseconds) of the last update.
    updated_at: i64,
}

impl ProgressRecord {
    /// Newest completed period.
    pub fn last_completed(&self) -> Option<Period> {
        self.last_completed
    }

    /// When the record last changed (unix millis).
    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

/// Durable mapping of category id → [`ProgressRecord`].
///
/// Entries are kept in a `BTreeMap` so the serialized form is stable across
/// load/save cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressStore {
    schema_version: String,
    categories: BTreeMap<String, ProgressRecord>,
}

impl ProgressStore {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            categories: BTreeMap::new(),
        }
    }

    /// Load from `path`, treating a missing file as an empty store.
    ///
    /// A file that exists but cannot be parsed is an error: silently starting
    /// over would re-download years of completed work.
    pub fn load_or_default(path: &Path) -> Result<Self, ProgressError> {
        if !path.exists() {
            debug!(path = %path.display(), "No progress store found, starting empty");
            return Ok(Self::new());
        }
        Self::load(path)
    }

    /// Load from an existing file.
    pub fn load(path: &Path) -> Result<Self, ProgressError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ProgressError::IoError(e.to_string()))?;

        let store: ProgressStore = serde_json::from_str(&contents)
            .map_err(|e| ProgressError::DeserializationError(e.to_string()))?;

        if store.schema_version != SCHEMA_VERSION {
            return Err(ProgressError::SchemaVersionMismatch {
                expected: SCHEMA_VERSION.to_string(),
                found: store.schema_version,
            });
        }

        debug!(
            path = %path.display(),
            categories = store.categories.len(),
            "Progress store loaded"
        );
        Ok(store)
    }

    /// Save to `path` atomically.
    ///
    /// Writes to a temp file in the same directory, fsyncs, then renames over
    /// the target, so readers only ever observe a complete store.
    pub fn save(&self, path: &Path) -> Result<(), ProgressError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ProgressError::IoError(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ProgressError::SerializationError(e.to_string()))?;

        let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir)
            .map_err(|e| ProgressError::IoError(format!("Failed to create temp file: {e}")))?;

        temp_file
            .write_all(json.as_bytes())
            .map_err(|e| ProgressError::IoError(format!("Failed to write temp file: {e}")))?;
        temp_file
            .flush()
            .map_err(|e| ProgressError::IoError(format!("Failed to flush temp file: {e}")))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| ProgressError::IoError(format!("Failed to sync temp file: {e}")))?;

        temp_file
            .persist(path)
            .map_err(|e| ProgressError::IoError(format!("Failed to persist temp file: {e}")))?;

        // Fsync parent directory so the rename itself is durable
        if let Some(parent) = path.parent() {
            if let Ok(dir) = std::fs::File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        debug!(path = %path.display(), "Progress store saved");
        Ok(())
    }

    /// The newest completed period for a category, if any.
    pub fn last_completed(&self, category_id: &str) -> Option<Period> {
        self.categories
            .get(category_id)
            .and_then(|r| r.last_completed)
    }

    /// Record a completed period for a category.
    ///
    /// Progress only ever advances: completing a period at or before the
    /// recorded one (an update-window re-download) leaves the record's
    /// `last_completed` untouched but refreshes its timestamp.
    pub fn record_completion(&mut self, category_id: &str, period: Period) {
        let now = chrono::Utc::now().timestamp_millis();
        let entry = self
            .categories
            .entry(category_id.to_string())
            .or_insert(ProgressRecord {
                last_completed: None,
                updated_at: now,
            });

        if entry.last_completed.is_none_or(|done| period > done) {
            entry.last_completed = Some(period);
            info!(category = category_id, period = %period, "Progress advanced");
        }
        entry.updated_at = now;
    }

    /// Drop all records, as a full rebuild does before ignoring old progress.
    pub fn reset(&mut self) {
        self.categories.clear();
    }

    /// All records, in stable key order.
    pub fn records(&self) -> impl Iterator<Item = (&str, &ProgressRecord)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of categories with a record.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether any category has a record.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors related to progress persistence
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Schema version mismatch
    #[error("progress schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch {
        /// Expected schema version
        expected: String,
        /// Found schema version
        found: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error
    #[error("deserialization error: {0}")]
    DeserializationError(String),

    /// Lock error
    #[error("lock error: {0}")]
    LockError(String),
}
