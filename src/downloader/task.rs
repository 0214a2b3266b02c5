//! Download task structures

use crate::{Category, Period};

/// The unit of work: one category's spreadsheet for one period.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    /// Property category being fetched
    pub category: Category,
    /// Year-month being fetched
    pub period: Period,
}

impl DownloadTask {
    /// Create a task for `category` in `period`.
    pub fn new(category: Category, period: Period) -> Self {
        Self { category, period }
    }
}

impl std::fmt::Display for DownloadTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.category.label(), self.period)
    }
}

/// How a task ended after the retry policy is done with it.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The spreadsheet was fetched; payload bytes attached.
    Success(Vec<u8>),
    /// The portal's daily cap was hit. The run stops issuing fetches.
    QuotaExhausted,
    /// The task failed past the retry budget or with a non-retryable error.
    /// Recorded in the run summary; progress for the period is not advanced.
    PermanentFailure(String),
    /// A halt was requested during a retry wait. The period is left
    /// unattempted for the next run.
    Aborted,
}
