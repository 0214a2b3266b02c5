//! CLI error types and conversions

use crate::downloader::RunError;
use crate::fetcher::FetchError;
use crate::progress::ProgressError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Run-level failure
    #[error("run error: {0}")]
    RunError(#[from] RunError),

    /// Fetch client setup failure
    #[error("fetcher error: {0}")]
    FetcherError(#[from] FetchError),

    /// Progress store failure
    #[error("progress error: {0}")]
    ProgressError(#[from] ProgressError),

    /// Registry failure
    #[error("registry error: {0}")]
    RegistryError(String),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
