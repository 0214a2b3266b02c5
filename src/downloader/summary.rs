//! End-of-run reporting
//!
//! Every run ends with a summary distinguishing completed, permanently
//! failed, and quota/halt-skipped tasks per category, so a month that fails
//! identically run after run is visible to the operator instead of being
//! silently retried forever.

use crate::planner::RunMode;
use crate::{Category, Period};

/// A permanently failed task, kept for the summary.
#[derive(Debug, Clone)]
pub struct FailedTask {
    /// Period that failed
    pub period: Period,
    /// Final error text
    pub error: String,
}

/// Per-category task tallies for one run.
#[derive(Debug, Clone)]
pub struct CategorySummary {
    /// Stable category identifier
    pub category_id: String,
    /// Display label
    pub label: String,
    /// Periods downloaded and recorded this run
    pub completed: u32,
    /// Periods skipped after the quota tripped or a halt was requested
    pub skipped: u32,
    /// Periods that failed past the retry budget
    pub failed: Vec<FailedTask>,
}

impl CategorySummary {
    /// Fresh tallies for `category`.
    pub fn new(category: &Category) -> Self {
        Self {
            category_id: category.id().to_string(),
            label: category.label().to_string(),
            completed: 0,
            skipped: 0,
            failed: Vec::new(),
        }
    }

    /// Record a permanent failure.
    pub fn record_failure(&mut self, period: Period, error: String) {
        self.failed.push(FailedTask { period, error });
    }
}

/// Whole-run result handed back to the caller.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Mode the run executed in
    pub mode: RunMode,
    /// Tallies per category, in registry order
    pub categories: Vec<CategorySummary>,
    /// Whether the portal's daily cap ended the run
    pub quota_halted: bool,
    /// Whether an operator halt or run deadline ended the run
    pub halted_early: bool,
}

impl RunSummary {
    /// Empty summary for a run in `mode`.
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            categories: Vec::new(),
            quota_halted: false,
            halted_early: false,
        }
    }

    /// Total completed tasks across categories.
    pub fn total_completed(&self) -> u32 {
        self.categories.iter().map(|c| c.completed).sum()
    }

    /// Total skipped tasks across categories.
    pub fn total_skipped(&self) -> u32 {
        self.categories.iter().map(|c| c.skipped).sum()
    }

    /// Total permanently failed tasks across categories.
    pub fn total_failed(&self) -> usize {
        self.categories.iter().map(|c| c.failed.len()).sum()
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ending = if self.quota_halted {
            "halted: daily quota exhausted"
        } else if self.halted_early {
            "halted: stop requested"
        } else {
            "completed"
        };
        writeln!(f, "Run summary (mode: {}, {ending})", self.mode)?;

        for cat in &self.categories {
            writeln!(
                f,
                "  {:<12} completed {:>4}  failed {:>2}  skipped {:>4}",
                cat.label,
                cat.completed,
                cat.failed.len(),
                cat.skipped
            )?;
            for failure in &cat.failed {
                writeln!(f, "    failed {}: {}", failure.period, failure.error)?;
            }
        }

        write!(
            f,
            "  total: completed {}, failed {}, skipped {}",
            self.total_completed(),
            self.total_failed(),
            self.total_skipped()
        )
    }
}
