//! Month range planning
//!
//! Computes which periods a run should fetch for a category, given the run
//! mode and the category's stored progress. Planning is pure: the same inputs
//! always produce the same sequence, so a plan can be recomputed freely (for
//! summaries, dry runs, or after a quota halt) without touching the portal.

use crate::{Period, FIRST_PERIOD};

/// The trailing window re-fetched by [`RunMode::UpdateWindow`].
///
/// The portal revises recently published months after the fact, so an update
/// run re-downloads the last year regardless of stored progress.
pub const UPDATE_WINDOW_MONTHS: u32 = 12;

/// What a run should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Everything from 2006-01 through the current month, resuming past the
    /// stored progress for each category.
    FullHistory,
    /// The trailing [`UPDATE_WINDOW_MONTHS`] months, ignoring stored progress.
    UpdateWindow,
    /// The most recent `n` months only; exercises the full pipeline without
    /// the cost of a historical backfill.
    BoundedTest(u32),
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::FullHistory => write!(f, "full"),
            RunMode::UpdateWindow => write!(f, "update"),
            RunMode::BoundedTest(n) => write!(f, "test({n})"),
        }
    }
}

/// An inclusive, oldest-first sequence of periods.
///
/// Lazy and restartable: cloning yields an identical sequence.
#[derive(Debug, Clone)]
pub struct PeriodRange {
    next: Option<Period>,
    last: Period,
}

impl PeriodRange {
    /// Inclusive range from `first` through `last`; empty if `first > last`.
    pub fn new(first: Period, last: Period) -> Self {
        Self {
            next: (first <= last).then_some(first),
            last,
        }
    }

    /// An empty range.
    pub fn empty() -> Self {
        Self {
            next: None,
            last: FIRST_PERIOD,
        }
    }

    /// Number of periods remaining in the sequence.
    pub fn len(&self) -> usize {
        self.clone().count()
    }

    /// Whether the sequence is exhausted.
    pub fn is_empty(&self) -> bool {
        self.next.is_none()
    }
}

impl Iterator for PeriodRange {
    type Item = Period;

    fn next(&mut self) -> Option<Period> {
        let current = self.next?;
        self.next = (current < self.last).then(|| current.succ());
        Some(current)
    }
}

/// Plan the period sequence for one category.
///
/// `last_completed` is the category's stored progress (`None` before the first
/// success) and `today` is the newest period the portal publishes. The result
/// is oldest-first, so a partially completed run always leaves a contiguous
/// completed prefix behind.
pub fn plan(mode: RunMode, last_completed: Option<Period>, today: Period) -> PeriodRange {
    match mode {
        RunMode::FullHistory => {
            let first = match last_completed {
                Some(done) => done.succ(),
                None => FIRST_PERIOD,
            };
            PeriodRange::new(first, today)
        }
        RunMode::UpdateWindow => {
            let first = today.saturating_sub_months(UPDATE_WINDOW_MONTHS - 1);
            PeriodRange::new(first, today)
        }
        RunMode::BoundedTest(0) => PeriodRange::empty(),
        RunMode::BoundedTest(n) => {
            let first = today.saturating_sub_months(n - 1);
            PeriodRange::new(first, today)
        }
    }
}
