//! End-to-end orchestrator scenarios against a deterministic portal fake
//!
//! No network: the fake scripts per-task outcomes, and everything else
//! (planner, retry, quota latch, progress store, output files, mirroring)
//! runs for real against temp directories.

use async_trait::async_trait;
use realestate_data_downloader::downloader::DownloadExecutor;
use realestate_data_downloader::fetcher::{FetchClient, FetchError, FetchResult};
use realestate_data_downloader::planner::RunMode;
use realestate_data_downloader::progress::ProgressStore;
use realestate_data_downloader::registry::CategoryRegistry;
use realestate_data_downloader::uploader::{MirrorSink, UploadError, UploadSink};
use realestate_data_downloader::{Category, Period};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Scripted outcome for one (category, period) task.
#[derive(Clone, Copy)]
enum Script {
    Quota,
    Transient,
    Permanent,
}

/// Portal fake: every unscripted task succeeds with a small xlsx payload.
struct FakePortal {
    scripted: HashMap<(String, String), Script>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakePortal {
    fn all_ok() -> Self {
        Self {
            scripted: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with(mut self, category_id: &str, period: &str, script: Script) -> Self {
        self.scripted
            .insert((category_id.to_string(), period.to_string()), script);
        self
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FetchClient for FakePortal {
    async fn fetch(&self, category: &Category, period: Period) -> FetchResult<Vec<u8>> {
        let key = (category.id().to_string(), period.to_string());
        self.calls.lock().unwrap().push(key.clone());
        match self.scripted.get(&key) {
            Some(Script::Quota) => Err(FetchError::QuotaExhausted),
            Some(Script::Transient) => Err(FetchError::Timeout("scripted timeout".into())),
            Some(Script::Permanent) => {
                Err(FetchError::UnrecognizedResponse("scripted html".into()))
            }
            None => Ok(b"PK\x03\x04 spreadsheet payload".to_vec()),
        }
    }
}

fn period(year: i32, month: u32) -> Period {
    Period::new(year, month).unwrap()
}

fn executor(
    portal: &Arc<FakePortal>,
    dir: &tempfile::TempDir,
    today: Period,
) -> DownloadExecutor {
    DownloadExecutor::new(
        portal.clone(),
        dir.path().join("data"),
        dir.path().join("progress.json"),
    )
    .with_today(today)
}

/// Seed the store so every category has completed through `done`.
fn seed_progress(dir: &tempfile::TempDir, done: Period) {
    let registry = CategoryRegistry::load().unwrap();
    let mut store = ProgressStore::new();
    for category in registry.categories() {
        store.record_completion(category.id(), done);
    }
    store.save(&dir.path().join("progress.json")).unwrap();
}

#[tokio::test]
async fn test_bounded_test_run_covers_two_months_per_category() {
    let dir = tempfile::TempDir::new().unwrap();
    let portal = Arc::new(FakePortal::all_ok());
    let today = period(2024, 3);

    let summary = executor(&portal, &dir, today)
        .run(RunMode::BoundedTest(2))
        .await
        .unwrap();

    // 2 most recent months x 8 categories
    assert_eq!(portal.call_count(), 16);
    assert_eq!(summary.total_completed(), 16);
    assert_eq!(summary.total_failed(), 0);
    assert_eq!(summary.total_skipped(), 0);
    assert!(!summary.quota_halted);

    // Files land under category-named directories
    let apartment_file = dir
        .path()
        .join("data")
        .join("아파트")
        .join("아파트 202403.xlsx");
    assert!(apartment_file.exists());

    // Progress reflects the newest month for every category
    let store = ProgressStore::load(&dir.path().join("progress.json")).unwrap();
    let registry = CategoryRegistry::load().unwrap();
    for category in registry.categories() {
        assert_eq!(store.last_completed(category.id()), Some(today));
    }
}

#[tokio::test]
async fn test_quota_halt_stops_every_category_and_keeps_prior_progress() {
    let dir = tempfile::TempDir::new().unwrap();
    // Every category has 202402 and 202403 left; the apartment 202403 fetch
    // trips the daily cap.
    seed_progress(&dir, period(2024, 1));
    let portal = Arc::new(FakePortal::all_ok().with("apartment", "202403", Script::Quota));
    let today = period(2024, 3);

    let summary = executor(&portal, &dir, today)
        .run(RunMode::FullHistory)
        .await
        .unwrap();

    // No fetch happens after the quota signal, in any category
    assert_eq!(
        portal.calls(),
        vec![
            ("apartment".to_string(), "202402".to_string()),
            ("apartment".to_string(), "202403".to_string()),
        ]
    );

    assert!(summary.quota_halted);
    assert_eq!(summary.total_completed(), 1);
    // apartment 202403 plus both periods of the other 7 categories
    assert_eq!(summary.total_skipped(), 15);

    // Progress advanced only through the month before the quota hit
    let store = ProgressStore::load(&dir.path().join("progress.json")).unwrap();
    assert_eq!(store.last_completed("apartment"), Some(period(2024, 2)));
    assert_eq!(store.last_completed("land"), Some(period(2024, 1)));
}

#[tokio::test(start_paused = true)]
async fn test_retry_exhaustion_fails_the_period_and_continues() {
    let dir = tempfile::TempDir::new().unwrap();
    seed_progress(&dir, period(2024, 1));
    let portal = Arc::new(FakePortal::all_ok().with("apartment", "202402", Script::Transient));
    let today = period(2024, 3);

    let summary = executor(&portal, &dir, today)
        .run(RunMode::FullHistory)
        .await
        .unwrap();

    // 3 attempts on the failing month, then the next month proceeds
    let calls = portal.calls();
    let attempts_202402 = calls
        .iter()
        .filter(|(cat, p)| cat == "apartment" && p == "202402")
        .count();
    assert_eq!(attempts_202402, 3);
    assert!(calls
        .iter()
        .any(|(cat, p)| cat == "apartment" && p == "202403"));

    // The failure is reported, not silently dropped
    assert_eq!(summary.total_failed(), 1);
    let apartment = summary
        .categories
        .iter()
        .find(|c| c.category_id == "apartment")
        .unwrap();
    assert_eq!(apartment.failed.len(), 1);
    assert_eq!(apartment.failed[0].period, period(2024, 2));

    // Progress still advanced with the succeeding month; the failed month
    // stays visible in summaries rather than being retried forever
    let store = ProgressStore::load(&dir.path().join("progress.json")).unwrap();
    assert_eq!(store.last_completed("apartment"), Some(period(2024, 3)));
}

#[tokio::test]
async fn test_unrecognized_response_is_not_retried_but_run_continues() {
    let dir = tempfile::TempDir::new().unwrap();
    seed_progress(&dir, period(2024, 1));
    let portal = Arc::new(FakePortal::all_ok().with("apartment", "202402", Script::Permanent));
    let today = period(2024, 3);

    let summary = executor(&portal, &dir, today)
        .run(RunMode::FullHistory)
        .await
        .unwrap();

    // A malformed response is given up on at the first attempt
    let calls = portal.calls();
    let attempts_202402 = calls
        .iter()
        .filter(|(cat, p)| cat == "apartment" && p == "202402")
        .count();
    assert_eq!(attempts_202402, 1);

    assert_eq!(summary.total_failed(), 1);
    assert_eq!(summary.total_completed(), 15);
    assert!(!summary.quota_halted);
}

#[tokio::test]
async fn test_rerun_after_complete_run_plans_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    let portal = Arc::new(FakePortal::all_ok());
    // Keep the history window small for the test
    seed_progress(&dir, period(2024, 1));
    let today = period(2024, 3);

    let first = executor(&portal, &dir, today)
        .run(RunMode::FullHistory)
        .await
        .unwrap();
    assert_eq!(first.total_completed(), 16);
    let calls_after_first = portal.call_count();

    let second = executor(&portal, &dir, today)
        .run(RunMode::FullHistory)
        .await
        .unwrap();
    assert_eq!(second.total_completed(), 0);
    assert_eq!(second.total_skipped(), 0);
    assert_eq!(portal.call_count(), calls_after_first);
}

#[tokio::test]
async fn test_update_window_refetches_despite_progress() {
    let dir = tempfile::TempDir::new().unwrap();
    let today = period(2024, 3);
    seed_progress(&dir, today);
    let portal = Arc::new(FakePortal::all_ok());

    let summary = executor(&portal, &dir, today)
        .run(RunMode::UpdateWindow)
        .await
        .unwrap();

    // Trailing 12 months per category, progress notwithstanding
    assert_eq!(summary.total_completed(), 96);
    assert_eq!(portal.call_count(), 96);

    // Re-downloading older months never regresses progress
    let store = ProgressStore::load(&dir.path().join("progress.json")).unwrap();
    assert_eq!(store.last_completed("apartment"), Some(today));
}

#[tokio::test]
async fn test_expired_deadline_skips_everything_without_fetching() {
    let dir = tempfile::TempDir::new().unwrap();
    let portal = Arc::new(FakePortal::all_ok());
    let today = period(2024, 3);

    let summary = executor(&portal, &dir, today)
        .with_max_runtime(std::time::Duration::ZERO)
        .run(RunMode::BoundedTest(2))
        .await
        .unwrap();

    assert_eq!(portal.call_count(), 0);
    assert_eq!(summary.total_skipped(), 16);
    assert!(summary.halted_early);
    assert!(!summary.quota_halted);
}

#[tokio::test]
async fn test_completed_files_are_mirrored() {
    let dir = tempfile::TempDir::new().unwrap();
    let mirror = tempfile::TempDir::new().unwrap();
    let portal = Arc::new(FakePortal::all_ok());
    let today = period(2024, 3);

    let summary = executor(&portal, &dir, today)
        .with_upload_sink(Arc::new(MirrorSink::new(mirror.path())))
        .run(RunMode::BoundedTest(1))
        .await
        .unwrap();
    assert_eq!(summary.total_completed(), 8);

    let mirrored = mirror.path().join("아파트").join("아파트 202403.xlsx");
    assert!(mirrored.exists());
    let mirrored = mirror
        .path()
        .join("연립_다세대")
        .join("연립_다세대 202403.xlsx");
    assert!(mirrored.exists());
}

/// Sink that always fails; uploads must not gate download progress.
struct BrokenSink;

#[async_trait]
impl UploadSink for BrokenSink {
    async fn upload(
        &self,
        _local_path: &Path,
        _category: &Category,
        _period: Period,
    ) -> Result<(), UploadError> {
        Err(UploadError::IoError("drive unreachable".into()))
    }
}

#[tokio::test]
async fn test_upload_failure_does_not_revert_progress() {
    let dir = tempfile::TempDir::new().unwrap();
    let portal = Arc::new(FakePortal::all_ok());
    let today = period(2024, 3);

    let summary = executor(&portal, &dir, today)
        .with_upload_sink(Arc::new(BrokenSink))
        .run(RunMode::BoundedTest(1))
        .await
        .unwrap();

    // Local download success is the durable unit of completion
    assert_eq!(summary.total_completed(), 8);
    assert_eq!(summary.total_failed(), 0);

    let store = ProgressStore::load(&dir.path().join("progress.json")).unwrap();
    assert_eq!(store.last_completed("apartment"), Some(today));
}

#[tokio::test]
async fn test_reset_progress_replans_from_scratch() {
    let dir = tempfile::TempDir::new().unwrap();
    let today = period(2024, 3);
    seed_progress(&dir, today);
    let portal = Arc::new(FakePortal::all_ok());

    // Without reset nothing would be planned (see the rerun test); with it
    // the full range is planned again. The zero deadline keeps the test from
    // actually fetching 18 years of months.
    let summary = executor(&portal, &dir, today)
        .with_reset_progress(true)
        .with_max_runtime(std::time::Duration::ZERO)
        .run(RunMode::FullHistory)
        .await
        .unwrap();

    assert_eq!(portal.call_count(), 0);
    // Full history from 2006-01 through 2024-03, for 8 categories
    let months: u32 = 18 * 12 + 3;
    assert_eq!(summary.total_skipped(), months * 8);

    // The on-disk store was reset as well
    let store = ProgressStore::load(&dir.path().join("progress.json")).unwrap();
    assert_eq!(store.last_completed("apartment"), None);
}
