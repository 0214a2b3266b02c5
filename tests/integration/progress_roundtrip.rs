//! Progress store durability and mutual exclusion

use realestate_data_downloader::progress::{ProgressStore, RunLock};
use realestate_data_downloader::registry::CategoryRegistry;
use realestate_data_downloader::Period;

fn period(year: i32, month: u32) -> Period {
    Period::new(year, month).unwrap()
}

#[test]
fn test_store_with_all_categories_round_trips_exactly() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("progress.json");
    let registry = CategoryRegistry::load().unwrap();

    let mut store = ProgressStore::new();
    for (i, category) in registry.categories().iter().enumerate() {
        store.record_completion(category.id(), period(2023, i as u32 + 1));
    }
    store.save(&path).unwrap();

    let loaded = ProgressStore::load(&path).unwrap();
    assert_eq!(loaded.len(), 8);

    // Same periods, same timestamps, same entry order
    let original: Vec<_> = store.records().collect();
    let reloaded: Vec<_> = loaded.records().collect();
    assert_eq!(original, reloaded);

    // Load→save is byte-stable: nothing is lost or reordered
    let first_bytes = std::fs::read(&path).unwrap();
    let second_path = dir.path().join("resaved.json");
    loaded.save(&second_path).unwrap();
    assert_eq!(first_bytes, std::fs::read(&second_path).unwrap());
}

#[test]
fn test_save_is_atomic_over_existing_state() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("progress.json");

    let mut store = ProgressStore::new();
    store.record_completion("apartment", period(2024, 1));
    store.save(&path).unwrap();

    store.record_completion("apartment", period(2024, 2));
    store.save(&path).unwrap();

    let loaded = ProgressStore::load(&path).unwrap();
    assert_eq!(loaded.last_completed("apartment"), Some(period(2024, 2)));
    // No temp files left behind next to the store
    let stray: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name() != "progress.json")
        .collect();
    assert!(stray.is_empty(), "stray files: {stray:?}");
}

#[test]
fn test_concurrent_run_is_refused_while_lock_held() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("progress.json");

    let mut holder = RunLock::open(&path).unwrap();
    let guard = holder.try_exclusive().unwrap();

    let mut contender = RunLock::open(&path).unwrap();
    assert!(contender.try_exclusive().is_err());

    drop(guard);
    assert!(contender.try_exclusive().is_ok());
}
