//! Shared handles to every persisted dashboard store

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::favorites::FavoritesStore;
use crate::settings::SettingsStore;
use persist_dispatch::storage;
use persist_dispatch::{KeyValueStorage, PersistOptions, SharedStorage};
use std::collections::BTreeMap;
use std::fmt;

/// The dashboard's persisted state
///
/// Both stores share one storage handle. Cloning the context clones handles,
/// not state, so it can be passed to every view that needs it.
#[derive(Clone)]
pub struct DashboardContext {
    pub favorites: FavoritesStore,
    pub settings: SettingsStore,
    storage: SharedStorage,
}

impl DashboardContext {
    /// Load both stores from `storage`
    pub fn load(storage: SharedStorage) -> Self {
        Self::with_options(storage, PersistOptions::default())
    }

    pub fn with_options(storage: SharedStorage, options: PersistOptions) -> Self {
        Self {
            favorites: FavoritesStore::with_options(storage.clone(), options),
            settings: SettingsStore::with_options(storage.clone(), options),
            storage,
        }
    }

    /// Validate `config`, open its backend and load both stores
    ///
    /// A storage file that exists but cannot be parsed is an error rather than
    /// a silent switch to in-memory state; [`clear_storage`](Self::clear_storage)
    /// removes it.
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        config.validate()?;
        let storage = storage::try_detect(&config.storage_config())?;
        tracing::debug!(
            backend = %config.backend,
            available = storage.is_available(),
            "Dashboard storage ready"
        );
        Ok(Self::with_options(storage, config.persist_options()))
    }

    /// Erase everything stored for `config`, without loading it first
    pub fn clear_storage(config: &DashboardConfig) -> Result<()> {
        config.validate()?;
        storage::reset(&config.storage_config())?;
        Ok(())
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// Every raw stored entry
    pub fn dump(&self) -> Result<BTreeMap<String, String>> {
        let mut entries = BTreeMap::new();
        for key in self.storage.keys()? {
            if let Some(value) = self.storage.get_item(&key)? {
                entries.insert(key, value);
            }
        }
        Ok(entries)
    }
}

impl fmt::Debug for DashboardContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardContext")
            .field("favorites", &self.favorites)
            .field("settings", &self.settings)
            .field("storage_available", &self.storage.is_available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::FavoritesAction;
    use crate::settings::{SettingsAction, TempUnit};
    use persist_dispatch::testing::StoreHarness;

    #[test]
    fn test_stores_share_storage() {
        let harness = StoreHarness::new();
        let mut ctx = DashboardContext::load(harness.storage());

        ctx.favorites.dispatch(FavoritesAction::Add("paris".into()));
        ctx.settings.dispatch(SettingsAction::SetUnit(TempUnit::Fahrenheit));

        let entries = ctx.dump().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["favorites"], r#"["paris"]"#);
        assert!(entries["settings"].contains(r#""unit":"F""#));
    }

    #[test]
    fn test_clones_see_the_same_state() {
        let harness = StoreHarness::new();
        let ctx = DashboardContext::load(harness.storage());
        let mut view = ctx.clone();

        view.favorites.dispatch(FavoritesAction::Add("tokyo".into()));
        assert!(ctx.favorites.contains("tokyo"));
    }

    #[test]
    fn test_from_config_rejects_bad_config() {
        let config = DashboardConfig {
            quota_bytes: Some(0),
            ..DashboardConfig::default()
        };
        assert!(DashboardContext::from_config(&config).is_err());
    }

    #[test]
    fn test_debug_output() {
        let harness = StoreHarness::new();
        let ctx = DashboardContext::load(harness.storage());

        let debug = format!("{:?}", ctx);
        assert!(debug.contains("FavoritesStore"));
        assert!(debug.contains("storage_available: true"));
    }
}
