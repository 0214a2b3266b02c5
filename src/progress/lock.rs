//! Run-level mutual exclusion over the progress store
//!
//! Advisory file locking via fd-lock. The lock is acquired once at run start
//! and held for the run's duration; the OS releases it when the process
//! exits, so a crashed run never wedges the next one.

use super::store::ProgressError;
use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Exclusive lock guarding a progress store file.
///
/// Open the lock once, then hold the guard from [`RunLock::try_exclusive`]
/// for the whole run:
///
/// ```no_run
/// # use realestate_data_downloader::progress::RunLock;
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut lock = RunLock::open("progress.json".as_ref())?;
/// let _guard = lock.try_exclusive()?;
/// // ... run ...
/// # Ok(())
/// # }
/// ```
pub struct RunLock {
    inner: RwLock<File>,
}

impl RunLock {
    /// Open (creating if needed) the lock file next to the progress store.
    pub fn open(progress_path: &Path) -> Result<Self, ProgressError> {
        if let Some(parent) = progress_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ProgressError::IoError(e.to_string()))?;
        }

        let lock_path = progress_path.with_extension("lock");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| ProgressError::LockError(format!("Failed to open lock file: {e}")))?;

        Ok(Self {
            inner: RwLock::new(file),
        })
    }

    /// Try to take the exclusive lock without blocking.
    ///
    /// Fails immediately if another run holds it; waiting would mean two
    /// orchestrators queued against the same store.
    pub fn try_exclusive(&mut self) -> Result<RwLockWriteGuard<'_, File>, ProgressError> {
        self.inner.try_write().map_err(|e| {
            ProgressError::LockError(format!(
                "progress store is locked by another run: {e}"
            ))
        })
    }
}
