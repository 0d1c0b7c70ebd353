//! Weather dashboard state
//!
//! Favorite locations and user settings, persisted across restarts through
//! persist-dispatch stores. A [`DashboardContext`] bundles both stores over a
//! single storage backend.

pub mod config;
pub mod context;
pub mod error;
pub mod favorites;
pub mod settings;

pub use config::{DashboardConfig, APP_NAME};
pub use context::DashboardContext;
pub use error::{DashboardError, Result};
pub use favorites::{FavoritesAction, FavoritesStore};
pub use settings::{Settings, SettingsAction, SettingsStore, TempUnit, MAX_FORECAST_DAYS};
