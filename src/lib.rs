//! # Real-Estate Data Downloader Library
//!
//! Downloads the monthly real-transaction spreadsheets published by the Korean
//! Ministry of Land (MOLIT) portal, one file per property category per month,
//! and mirrors the completed files into a cloud-synced drive folder.
//!
//! ## Features
//!
//! - **8 Property Categories**: apartments through factories/warehouses, each
//!   tracked independently
//! - **Resume Capability**: per-category progress is persisted after every
//!   completed month, so interrupted runs pick up where they left off
//! - **Daily Quota Handling**: the portal caps downloads per day; once the cap
//!   is hit the run halts cleanly and the next invocation resumes
//! - **Bounded Retries**: transient portal failures are retried with a fixed
//!   delay before a month is given up on
//! - **Mirroring**: completed spreadsheets are copied into a drive-synced
//!   folder in the background, without gating download progress
//!
//! ## Quick Start
//!
//! ```no_run
//! use realestate_data_downloader::downloader::DownloadExecutor;
//! use realestate_data_downloader::fetcher::molit::MolitFetchClient;
//! use realestate_data_downloader::planner::RunMode;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = DownloadExecutor::new(
//!     Arc::new(MolitFetchClient::new()?),
//!     "./data".into(),
//!     "./progress.json".into(),
//! );
//! let summary = executor.run(RunMode::UpdateWindow).await?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`registry`] - The fixed set of property categories and their labels
//! - [`planner`] - Month range planning per run mode and stored progress
//! - [`fetcher`] - Portal fetch contract and the MOLIT implementation
//! - [`downloader`] - Run orchestration with retry and quota handling
//! - [`progress`] - Durable per-category progress store and the run lock
//! - [`output`] - Spreadsheet file placement and atomic writes
//! - [`uploader`] - Mirroring completed files to a drive folder

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// CLI command implementations
pub mod cli;

/// Run orchestration
pub mod downloader;

/// Portal fetch contract and implementations
pub mod fetcher;

/// Spreadsheet file placement
pub mod output;

/// Month range planning
pub mod planner;

/// Durable progress store and run lock
pub mod progress;

/// Property category registry
pub mod registry;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

/// Upload sink for mirroring completed files
pub mod uploader;

// Re-export commonly used types
pub use registry::Category;

/// A calendar year-month of transaction data.
///
/// The portal publishes one spreadsheet per category per period. Periods are
/// totally ordered and render as a 6-digit `YYYYMM` string, which is also the
/// wire format in the progress store and in output file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

/// The first period the portal publishes data for.
pub const FIRST_PERIOD: Period = Period {
    year: 2006,
    month: 1,
};

impl Period {
    /// Create a period, validating the calendar bounds.
    ///
    /// The portal's data starts at 2006-01; earlier periods are rejected.
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        let period = Self { year, month };
        if period < FIRST_PERIOD {
            return Err(PeriodError::BeforeHistoryStart { year, month });
        }
        Ok(period)
    }

    /// The year component.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month component (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The current period in UTC.
    pub fn current() -> Self {
        use chrono::Datelike;
        let now = chrono::Utc::now();
        Self {
            year: now.year(),
            month: now.month(),
        }
    }

    /// The period immediately after this one.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Step back `months`, saturating at [`FIRST_PERIOD`].
    pub fn saturating_sub_months(&self, months: u32) -> Self {
        let index = self.index() - i64::from(months);
        if index <= FIRST_PERIOD.index() {
            return FIRST_PERIOD;
        }
        Self {
            year: (index / 12) as i32,
            month: (index % 12) as u32 + 1,
        }
    }

    fn index(&self) -> i64 {
        i64::from(self.year) * 12 + (i64::from(self.month) - 1)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PeriodError::InvalidFormat(s.to_string()));
        }
        let year: i32 = s[..4]
            .parse()
            .map_err(|_| PeriodError::InvalidFormat(s.to_string()))?;
        let month: u32 = s[4..]
            .parse()
            .map_err(|_| PeriodError::InvalidFormat(s.to_string()))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.to_string()
    }
}

/// Errors constructing or parsing a [`Period`]
#[derive(Debug, thiserror::Error)]
pub enum PeriodError {
    /// Month outside 1-12
    #[error("invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    /// Period predates the portal's data
    #[error("period {year:04}-{month:02} predates available data (starts 2006-01)")]
    BeforeHistoryStart {
        /// Requested year
        year: i32,
        /// Requested month
        month: u32,
    },

    /// Not a 6-digit `YYYYMM` string
    #[error("invalid period string: {0:?} (expected YYYYMM)")]
    InvalidFormat(String),
}
