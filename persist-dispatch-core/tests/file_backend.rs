//! End-to-end tests for persisted values on the file backend

use persist_dispatch_core::storage::{self, Backend, StorageConfig};
use persist_dispatch_core::{PersistentObservable, Recorder};
use std::fs;

fn config(dir: &tempfile::TempDir) -> StorageConfig {
    StorageConfig::new("persist-dispatch-tests").dir(dir.path())
}

#[test]
fn test_value_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let storage = storage::detect(&config(&dir));
        let cities = PersistentObservable::init("favorites", Vec::<String>::new(), storage);
        cities.set(vec!["kyiv".into(), "lviv".into()]);
    }

    // A fresh backend reads the file again, like a new browser session
    let storage = storage::detect(&config(&dir));
    let cities = PersistentObservable::init("favorites", Vec::<String>::new(), storage);
    assert_eq!(cities.get(), vec!["kyiv", "lviv"]);
}

#[test]
fn test_two_keys_share_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage::detect(&config(&dir));

    let favorites = PersistentObservable::init("favorites", Vec::<String>::new(), storage.clone());
    let days = PersistentObservable::init("days", 5u32, storage);
    favorites.set(vec!["oslo".into()]);
    days.set(7);

    let raw = fs::read_to_string(dir.path().join(storage::DEFAULT_FILE_NAME)).unwrap();
    assert!(raw.contains("\"favorites\""));
    assert!(raw.contains("\"days\": \"7\""));
}

#[test]
fn test_disabled_backend_never_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage::detect(&config(&dir).backend(Backend::Disabled));

    let days = PersistentObservable::init("days", 5u32, storage);
    let recorder = Recorder::new();
    let _sub = days.subscribe(recorder.callback());
    days.set(3);

    assert_eq!(recorder.values(), vec![5, 3]);
    assert!(!dir.path().join(storage::DEFAULT_FILE_NAME).exists());
}

#[test]
fn test_quota_on_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage::detect(&config(&dir).quota_bytes(32));

    let favorites = PersistentObservable::init("favorites", Vec::<String>::new(), storage);
    let too_big: Vec<String> = (0..10).map(|i| format!("city-{i}")).collect();

    assert!(favorites.try_set(too_big.clone()).is_err());
    assert_eq!(favorites.get(), too_big);
}
