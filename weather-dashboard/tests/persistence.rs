//! Persistence behaviour of the dashboard stores across reloads

use persist_dispatch::storage::Backend;
use persist_dispatch::testing::{Recorder, StoreHarness};
use persist_dispatch::{KeyValueStorage, NoopStorage, SharedStorage};
use std::rc::Rc;
use persist_dispatch::StorageError;
use std::fs;
use weather_dashboard::{
    DashboardConfig, DashboardContext, DashboardError, FavoritesAction, FavoritesStore, Settings, SettingsAction,
    SettingsStore, TempUnit,
};

fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_defaults_without_prior_storage() {
    let harness = StoreHarness::new();
    let ctx = DashboardContext::load(harness.storage());

    assert!(ctx.favorites.get().is_empty());
    assert_eq!(
        ctx.settings.get(),
        Settings {
            dark_mode: false,
            unit: TempUnit::Celsius,
            forecast_days: 5,
        }
    );
}

#[test]
fn test_favorites_example_from_stored_list() {
    let harness = StoreHarness::with_items([("favorites", r#"["paris","tokyo"]"#)]);
    let favorites = FavoritesStore::init(harness.storage());
    assert_eq!(favorites.get(), ids(&["paris", "tokyo"]));

    favorites.set(ids(&["paris"]));
    assert_eq!(harness.raw("favorites").as_deref(), Some(r#"["paris"]"#));
}

#[test]
fn test_favorites_round_trip() {
    let harness = StoreHarness::new();
    let value = ids(&["kyiv", "paris", "kyiv", "", "são-paulo"]);

    FavoritesStore::init(harness.storage()).set(value.clone());
    assert_eq!(FavoritesStore::init(harness.storage()).get(), value);
}

#[test]
fn test_settings_round_trip() {
    let harness = StoreHarness::new();
    let value = Settings {
        dark_mode: true,
        unit: TempUnit::Fahrenheit,
        forecast_days: 14,
    };

    SettingsStore::init(harness.storage()).set(value.clone());
    assert_eq!(SettingsStore::init(harness.storage()).get(), value);
}

#[test]
fn test_settings_stored_by_another_client() {
    let harness = StoreHarness::with_items([(
        "settings",
        r#"{"darkMode": true, "unit": "F", "forecastDays": 3}"#,
    )]);
    let settings = SettingsStore::init(harness.storage());

    assert!(settings.dark_mode());
    assert_eq!(settings.unit(), TempUnit::Fahrenheit);
    assert_eq!(settings.forecast_days(), 3);
}

#[test]
fn test_subscribe_after_sets_sees_latest() {
    let harness = StoreHarness::new();
    let mut favorites = FavoritesStore::init(harness.storage());
    for id in ["a", "b", "c"] {
        favorites.dispatch(FavoritesAction::Add(id.into()));
    }

    let recorder = Recorder::new();
    let _sub = favorites.subscribe(recorder.callback());
    assert_eq!(recorder.values(), vec![ids(&["a", "b", "c"])]);
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let harness = StoreHarness::new();
    let mut settings = SettingsStore::init(harness.storage());
    let recorder = Recorder::new();

    let sub = settings.subscribe(recorder.callback());
    settings.dispatch(SettingsAction::ToggleDarkMode);
    sub.unsubscribe();
    settings.dispatch(SettingsAction::ToggleDarkMode);

    assert_eq!(recorder.len(), 2);
    assert!(!settings.dark_mode());
}

#[test]
fn test_malformed_storage_falls_back() {
    let harness = StoreHarness::with_items([
        ("favorites", "[\"paris\","),
        ("settings", "not json at all"),
    ]);
    let ctx = DashboardContext::load(harness.storage());

    assert!(ctx.favorites.is_empty());
    assert_eq!(ctx.settings.get(), Settings::default());
    // Defaults were written back over the broken text
    assert_eq!(harness.raw("favorites").as_deref(), Some("[]"));
}

#[test]
fn test_wrong_shape_falls_back() {
    let harness = StoreHarness::with_items([("favorites", r#"{"paris":1}"#), ("settings", "[1,2]")]);
    let ctx = DashboardContext::load(harness.storage());

    assert!(ctx.favorites.is_empty());
    assert_eq!(ctx.settings.get(), Settings::default());
}

#[test]
fn test_unavailable_storage_uses_defaults() {
    let storage: SharedStorage = Rc::new(NoopStorage);
    let mut ctx = DashboardContext::load(storage.clone());

    ctx.favorites.dispatch(FavoritesAction::Add("paris".into()));
    assert_eq!(ctx.favorites.get(), ids(&["paris"]));
    assert!(storage.keys().unwrap().is_empty());

    let reloaded = DashboardContext::load(storage);
    assert!(reloaded.favorites.is_empty());
}

#[test]
fn test_quota_keeps_memory_value() {
    // Enough for both defaults, not for a long favorites list
    let harness = StoreHarness::with_quota(80);
    let mut favorites = FavoritesStore::init(harness.storage());
    let long: Vec<String> = (0..20).map(|i| format!("location-{i}")).collect();

    assert!(favorites
        .try_dispatch(FavoritesAction::Replace(long.clone()))
        .is_err());
    assert_eq!(favorites.get(), long);
    assert_eq!(harness.raw("favorites").as_deref(), Some("[]"));
}

#[test]
fn test_file_backend_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig {
        storage_dir: Some(dir.path().to_path_buf()),
        ..DashboardConfig::default()
    };

    {
        let mut ctx = DashboardContext::from_config(&config).unwrap();
        ctx.favorites.dispatch(FavoritesAction::Add("lisbon".into()));
        ctx.settings.dispatch(SettingsAction::SetUnit(TempUnit::Fahrenheit));
    }

    let ctx = DashboardContext::from_config(&config).unwrap();
    assert_eq!(ctx.favorites.get(), ids(&["lisbon"]));
    assert_eq!(ctx.settings.unit(), TempUnit::Fahrenheit);
}

#[test]
fn test_disabled_backend_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig {
        backend: Backend::Disabled,
        storage_dir: Some(dir.path().to_path_buf()),
        ..DashboardConfig::default()
    };

    let ctx = DashboardContext::from_config(&config).unwrap();
    assert!(!ctx.storage().is_available());
    assert!(ctx.dump().unwrap().is_empty());
}

#[test]
fn test_set_unchanged_value_reaches_subscribers_and_storage() {
    let harness = StoreHarness::with_items([("favorites", r#"["paris"]"#)]);
    let ctx = DashboardContext::load(harness.storage());
    let favorites = Recorder::new();
    let settings = Recorder::new();
    let _favorites_sub = ctx.favorites.subscribe(favorites.callback());
    let _settings_sub = ctx.settings.subscribe(settings.callback());

    // Storage changed behind the store's back
    harness.put_raw("favorites", "[]");
    ctx.favorites.set(ids(&["paris"]));
    ctx.settings.set(Settings::default());

    assert_eq!(favorites.len(), 2);
    assert_eq!(settings.len(), 2);
    assert_eq!(harness.raw("favorites").as_deref(), Some(r#"["paris"]"#));
}

fn file_config(dir: &tempfile::TempDir) -> DashboardConfig {
    DashboardConfig {
        storage_dir: Some(dir.path().to_path_buf()),
        ..DashboardConfig::default()
    }
}

#[test]
fn test_corrupt_storage_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    fs::write(&path, "{ broken").unwrap();

    let err = DashboardContext::from_config(&file_config(&dir)).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::Storage(StorageError::Corrupt { .. })
    ));
    // Nothing was written over the user's file
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ broken");
}

#[test]
fn test_clear_storage_recovers_from_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(&dir);
    fs::write(dir.path().join("storage.json"), "{ broken").unwrap();

    DashboardContext::clear_storage(&config).unwrap();

    let mut ctx = DashboardContext::from_config(&config).unwrap();
    assert!(ctx.storage().is_available());
    assert!(ctx.favorites.is_empty());
    assert!(ctx
        .favorites
        .try_dispatch(FavoritesAction::Add("paris".into()))
        .unwrap());

    let reloaded = DashboardContext::from_config(&config).unwrap();
    assert_eq!(reloaded.favorites.get(), ids(&["paris"]));
}

#[test]
fn test_clear_storage_forgets_saved_state() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(&dir);
    {
        let mut ctx = DashboardContext::from_config(&config).unwrap();
        ctx.favorites.dispatch(FavoritesAction::Add("rome".into()));
        ctx.settings.dispatch(SettingsAction::ToggleDarkMode);
    }

    DashboardContext::clear_storage(&config).unwrap();

    let ctx = DashboardContext::from_config(&config).unwrap();
    assert!(ctx.favorites.is_empty());
    assert_eq!(ctx.settings.get(), Settings::default());
}

#[test]
fn test_clear_storage_on_memory_backend() {
    let config = DashboardConfig {
        backend: Backend::Memory,
        ..DashboardConfig::default()
    };
    assert!(DashboardContext::clear_storage(&config).is_ok());
}

