//! Portal fetch contract and implementations
//!
//! The orchestrator only ever talks to the portal through the [`FetchClient`]
//! trait, so tests drive the whole pipeline against a deterministic fake and
//! the portal-specific mechanics stay confined to [`molit`].

use crate::{Category, Period};
use async_trait::async_trait;

pub mod molit;

/// Fetch errors, classified the way the retry policy consumes them
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection-level failure; worth retrying
    #[error("network error: {0}")]
    NetworkError(String),

    /// The portal did not answer within the request timeout; worth retrying
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The portal answered but could not serve the export; worth retrying
    #[error("portal error: {0}")]
    PortalError(String),

    /// The portal's daily download cap has been reached. Retrying within the
    /// same day cannot succeed.
    #[error("daily download quota exhausted")]
    QuotaExhausted,

    /// The response matched no known shape (not a spreadsheet, not the quota
    /// notice). Not retried.
    #[error("unrecognized response: {0}")]
    UnrecognizedResponse(String),
}

impl FetchError {
    /// Whether the retry policy should attempt this fetch again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::NetworkError(_) | FetchError::Timeout(_) | FetchError::PortalError(_)
        )
    }
}

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// One period's spreadsheet download for one category.
#[async_trait]
pub trait FetchClient: Send + Sync {
    /// Fetch the spreadsheet bytes for `category` in `period`.
    ///
    /// Returns the raw `.xlsx` bytes on success. How the portal is driven
    /// (direct HTTP, UI automation) is an implementation detail behind this
    /// contract.
    async fn fetch(&self, category: &Category, period: Period) -> FetchResult<Vec<u8>>;
}
