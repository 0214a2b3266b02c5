//! Durable download progress and run mutual exclusion
//!
//! The progress store is the single source of truth for resumption: one
//! record per category, advanced after every completed month and persisted
//! immediately, so an interrupted run loses at most the month in flight.
//! The run lock keeps two invocations from mutating the same store.

pub mod lock;
pub mod store;

pub use lock::RunLock;
pub use store::{ProgressError, ProgressRecord, ProgressStore};
