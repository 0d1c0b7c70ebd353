//! Runtime configuration for the dashboard's storage

use crate::error::{DashboardError, Result};
use persist_dispatch::storage::{Backend, StorageConfig};
use persist_dispatch::PersistOptions;
use std::path::PathBuf;

/// Application name, also the default storage directory under the config dir
pub const APP_NAME: &str = "weather-dashboard";

/// Where the dashboard keeps its state
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub backend: Backend,
    /// Overrides `<config dir>/weather-dashboard`
    pub storage_dir: Option<PathBuf>,
    pub quota_bytes: Option<usize>,
    /// Write loaded (or default) values back to storage on startup
    pub sync_on_load: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend: Backend::File,
            storage_dir: None,
            quota_bytes: None,
            sync_on_load: true,
        }
    }
}

impl DashboardConfig {
    /// Reject settings that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.quota_bytes == Some(0) {
            return Err(DashboardError::Config(
                "storage quota must be greater than zero".into(),
            ));
        }
        if self.backend == Backend::Web && !cfg!(all(target_arch = "wasm32", feature = "web")) {
            return Err(DashboardError::Config(
                "the web backend needs a browser build".into(),
            ));
        }
        if let Some(dir) = &self.storage_dir {
            if self.backend == Backend::File && dir.exists() && !dir.is_dir() {
                return Err(DashboardError::Config(format!(
                    "storage dir {} is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    pub fn storage_config(&self) -> StorageConfig {
        let mut config = StorageConfig::new(APP_NAME).backend(self.backend);
        if let Some(dir) = &self.storage_dir {
            config = config.dir(dir);
        }
        if let Some(limit) = self.quota_bytes {
            config = config.quota_bytes(limit);
        }
        config
    }

    pub fn persist_options(&self) -> PersistOptions {
        PersistOptions {
            sync_on_load: self.sync_on_load,
        }
    }
}
