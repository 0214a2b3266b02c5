//! Status command implementation
//!
//! Prints the persisted progress mapping per category: how far each
//! category's download has advanced and when it last moved.

use super::CliError;
use crate::progress::ProgressStore;
use crate::registry::CategoryRegistry;
use chrono::{TimeZone, Utc};
use std::path::PathBuf;

/// Arguments for the status command
#[derive(clap::Args, Debug)]
pub struct StatusCommand {
    /// Progress store location
    #[arg(long, default_value = "progress.json")]
    pub progress_file: PathBuf,
}

impl StatusCommand {
    /// Print per-category progress to stdout.
    pub fn execute(&self) -> Result<(), CliError> {
        let registry =
            CategoryRegistry::load().map_err(|e| CliError::RegistryError(e.to_string()))?;
        let store = ProgressStore::load_or_default(&self.progress_file)?;

        println!("Progress ({})", self.progress_file.display());
        for category in registry.categories() {
            match store
                .records()
                .find(|(id, _)| *id == category.id())
                .map(|(_, record)| record)
            {
                Some(record) => {
                    let last = record
                        .last_completed()
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    let updated = Utc
                        .timestamp_millis_opt(record.updated_at())
                        .single()
                        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                        .unwrap_or_else(|| "?".to_string());
                    println!("  {:<12} last completed {last}  (updated {updated})", category.label());
                }
                None => {
                    println!("  {:<12} no progress yet", category.label());
                }
            }
        }
        Ok(())
    }
}
