//! Retry policy for a single download task
//!
//! Classifies each fetch outcome and retries only the transient ones, with a
//! fixed delay, up to the attempt budget. The quota signal aborts
//! immediately at whichever attempt it appears: retrying against an
//! exhausted daily cap cannot succeed.

use super::config::{MAX_ATTEMPTS, RETRY_DELAY};
use super::task::{DownloadTask, TaskOutcome};
use crate::fetcher::{FetchClient, FetchError};
use crate::shutdown::HaltSignal;
use tracing::{error, warn};

/// Run one task to a terminal outcome.
///
/// A `halt` signal, if provided, is only observed during retry waits; an
/// attempt already issued always runs to completion.
pub async fn execute(
    fetcher: &dyn FetchClient,
    task: &DownloadTask,
    halt: Option<&HaltSignal>,
) -> TaskOutcome {
    let mut last_error = String::new();

    for attempt in 1..=MAX_ATTEMPTS {
        match fetcher.fetch(&task.category, task.period).await {
            Ok(bytes) => return TaskOutcome::Success(bytes),
            Err(FetchError::QuotaExhausted) => {
                warn!(task = %task, attempt, "Daily quota exhausted");
                return TaskOutcome::QuotaExhausted;
            }
            Err(e) if e.is_transient() => {
                warn!(
                    task = %task,
                    attempt,
                    max_attempts = MAX_ATTEMPTS,
                    error = %e,
                    "Transient fetch failure"
                );
                last_error = e.to_string();
            }
            Err(e) => {
                error!(task = %task, attempt, error = %e, "Non-retryable fetch failure");
                return TaskOutcome::PermanentFailure(e.to_string());
            }
        }

        if attempt < MAX_ATTEMPTS {
            if let Some(halt) = halt {
                tokio::select! {
                    _ = tokio::time::sleep(RETRY_DELAY) => {}
                    _ = halt.halted() => {
                        warn!(task = %task, "Halt requested during retry wait");
                        return TaskOutcome::Aborted;
                    }
                }
            } else {
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }

    TaskOutcome::PermanentFailure(format!(
        "{MAX_ATTEMPTS} attempts exhausted, last error: {last_error}"
    ))
}
