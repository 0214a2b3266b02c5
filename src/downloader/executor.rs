//! Run executor
//!
//! Drives the planner, retry policy, and quota guard across all categories
//! in registry order, periods oldest-first within each category. Progress is
//! persisted after every completed period; uploads run in the background and
//! are drained before the run returns.

use super::quota::QuotaGuard;
use super::retry;
use super::summary::{CategorySummary, RunSummary};
use super::task::{DownloadTask, TaskOutcome};
use super::RunError;
use crate::fetcher::FetchClient;
use crate::output;
use crate::planner::{self, RunMode};
use crate::progress::{ProgressStore, RunLock};
use crate::registry::CategoryRegistry;
use crate::shutdown::SharedHalt;
use crate::uploader::UploadSink;
use crate::Period;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Orchestrates one run from progress load to summary.
pub struct DownloadExecutor {
    fetcher: Arc<dyn FetchClient>,
    sink: Option<Arc<dyn UploadSink>>,
    output_root: PathBuf,
    progress_path: PathBuf,
    halt: Option<SharedHalt>,
    max_runtime: Option<Duration>,
    today: Option<Period>,
    reset_progress: bool,
    show_progress: bool,
}

impl DownloadExecutor {
    /// Create an executor writing under `output_root` and resuming from the
    /// store at `progress_path`.
    pub fn new(
        fetcher: Arc<dyn FetchClient>,
        output_root: PathBuf,
        progress_path: PathBuf,
    ) -> Self {
        Self {
            fetcher,
            sink: None,
            output_root,
            progress_path,
            halt: None,
            max_runtime: None,
            today: None,
            reset_progress: false,
            show_progress: false,
        }
    }

    /// Mirror completed files into `sink` in the background.
    pub fn with_upload_sink(mut self, sink: Arc<dyn UploadSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Attach a shared halt signal for graceful stops at period boundaries.
    pub fn with_halt(mut self, halt: SharedHalt) -> Self {
        self.halt = Some(halt);
        self
    }

    /// Stop issuing new tasks once the run has lasted this long. An attempt
    /// already in flight always finishes first.
    pub fn with_max_runtime(mut self, max_runtime: Duration) -> Self {
        self.max_runtime = Some(max_runtime);
        self
    }

    /// Override the newest published period (defaults to the current UTC
    /// month).
    pub fn with_today(mut self, today: Period) -> Self {
        self.today = Some(today);
        self
    }

    /// Discard stored progress before planning, forcing a full re-fetch.
    pub fn with_reset_progress(mut self, reset: bool) -> Self {
        self.reset_progress = reset;
        self
    }

    /// Draw per-category progress bars on stderr.
    pub fn with_progress_bars(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Execute one run to Completed or Halted.
    ///
    /// Only setup failures (lock contention, unreadable store) surface as
    /// `Err`; task-level failures end up in the returned [`RunSummary`].
    pub async fn run(&self, mode: RunMode) -> Result<RunSummary, RunError> {
        let registry =
            CategoryRegistry::load().map_err(|e| RunError::Registry(e.to_string()))?;

        // Held for the whole run; a concurrent invocation fails fast here
        // instead of corrupting shared progress.
        let mut lock = RunLock::open(&self.progress_path)?;
        let _guard = lock.try_exclusive()?;

        let mut store = ProgressStore::load_or_default(&self.progress_path)?;
        if self.reset_progress {
            warn!("Resetting stored progress; all categories start from scratch");
            store.reset();
            store.save(&self.progress_path)?;
        }

        let today = self.today.unwrap_or_else(Period::current);
        info!(mode = %mode, today = %today, "Starting run");

        let quota = QuotaGuard::new();
        let mut uploads: JoinSet<()> = JoinSet::new();
        let started = Instant::now();

        let result = self
            .process_categories(mode, registry, &mut store, &quota, today, started, &mut uploads)
            .await;

        // Uploads never gate download progress, but they must land (or be
        // reported failed) before the process exits.
        while uploads.join_next().await.is_some() {}

        let summary = result?;
        info!(
            completed = summary.total_completed(),
            failed = summary.total_failed(),
            skipped = summary.total_skipped(),
            quota_halted = summary.quota_halted,
            "Run finished"
        );
        Ok(summary)
    }

    #[allow(clippy::too_many_arguments)]
    async fn process_categories(
        &self,
        mode: RunMode,
        registry: &CategoryRegistry,
        store: &mut ProgressStore,
        quota: &QuotaGuard,
        today: Period,
        started: Instant,
        uploads: &mut JoinSet<()>,
    ) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary::new(mode);

        for category in registry.categories() {
            let planned = planner::plan(mode, store.last_completed(category.id()), today);
            let mut cat_summary = CategorySummary::new(category);

            info!(
                category = category.id(),
                planned = planned.len(),
                resume_from = ?store.last_completed(category.id()).map(|p| p.to_string()),
                "Planning category"
            );

            let bar = self.category_bar(category.label(), planned.len() as u64);

            for period in planned {
                if self.should_stop(quota, started) {
                    cat_summary.skipped += 1;
                    continue;
                }

                let task = DownloadTask::new(category.clone(), period);
                match retry::execute(self.fetcher.as_ref(), &task, self.halt.as_deref()).await {
                    TaskOutcome::Success(bytes) => {
                        let path = output::spreadsheet_path(&self.output_root, category, period);
                        match output::write_spreadsheet(&path, &bytes) {
                            Ok(()) => {
                                store.record_completion(category.id(), period);
                                store.save(&self.progress_path)?;
                                cat_summary.completed += 1;
                                info!(task = %task, "Period completed");

                                if let Some(sink) = &self.sink {
                                    let sink = sink.clone();
                                    let category = category.clone();
                                    uploads.spawn(async move {
                                        if let Err(e) =
                                            sink.upload(&path, &category, period).await
                                        {
                                            error!(
                                                category = category.id(),
                                                period = %period,
                                                error = %e,
                                                "Upload failed; local file kept, will be re-mirrored next run"
                                            );
                                        }
                                    });
                                }
                            }
                            Err(e) => {
                                error!(task = %task, error = %e, "Failed to write spreadsheet");
                                cat_summary.record_failure(period, e.to_string());
                            }
                        }
                    }
                    TaskOutcome::QuotaExhausted => {
                        warn!(
                            task = %task,
                            "Daily quota exhausted; no further fetches this run"
                        );
                        quota.trip();
                        cat_summary.skipped += 1;
                    }
                    TaskOutcome::PermanentFailure(err) => {
                        error!(task = %task, error = %err, "Task failed permanently");
                        cat_summary.record_failure(period, err);
                    }
                    TaskOutcome::Aborted => {
                        cat_summary.skipped += 1;
                    }
                }

                bar.inc(1);
            }

            bar.finish_and_clear();
            summary.categories.push(cat_summary);
        }

        summary.quota_halted = quota.is_exhausted();
        summary.halted_early = self.halt_requested() || self.deadline_passed(started);
        Ok(summary)
    }

    /// Whether to skip the remaining work: the quota tripped, a halt was
    /// requested, or the run deadline passed. All three only ever take
    /// effect between tasks.
    fn should_stop(&self, quota: &QuotaGuard, started: Instant) -> bool {
        quota.is_exhausted() || self.halt_requested() || self.deadline_passed(started)
    }

    fn halt_requested(&self) -> bool {
        self.halt.as_ref().is_some_and(|h| h.is_halted())
    }

    fn deadline_passed(&self, started: Instant) -> bool {
        self.max_runtime
            .is_some_and(|limit| started.elapsed() >= limit)
    }

    fn category_bar(&self, label: &str, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
                .expect("progress template is valid")
                .progress_chars("#>-"),
        );
        bar.set_message(label.to_string());
        bar
    }
}
