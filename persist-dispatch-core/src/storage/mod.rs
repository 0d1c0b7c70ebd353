//! Persistent key-value storage
//!
//! Stores mirror their values into a [`KeyValueStorage`]: a string-to-string
//! map with the same shape as the browser's `localStorage`. Several backends
//! are provided and one is picked once, at construction time:
//!
//! - [`FileStorage`]: a JSON file on disk (native stand-in for `localStorage`)
//! - [`MemoryStorage`]: an in-memory map, used by tests and `--backend memory`
//! - [`NoopStorage`]: reports itself unavailable; stores skip all storage I/O
//! - `WebStorage`: `window.localStorage` (wasm32 with the `web` feature)
//!
//! Use [`detect`] to build the backend described by a [`StorageConfig`].

mod file;
mod memory;
mod noop;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod web;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use noop::NoopStorage;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use web::WebStorage;

use crate::error::{Result, StorageError};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

/// String key-value storage shared by every store of an application
///
/// All methods take `&self`: backends use interior mutability so one handle
/// can be shared (as [`SharedStorage`]) between several stores.
pub trait KeyValueStorage {
    /// Whether this backend actually persists anything.
    ///
    /// Stores skip every storage operation when this returns `false`.
    fn is_available(&self) -> bool {
        true
    }

    /// Read the raw string stored under `key`
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Remove every key
    fn clear(&self) -> Result<()>;

    /// All stored keys, in a stable order
    fn keys(&self) -> Result<Vec<String>>;
}

/// Shared handle to a storage backend
pub type SharedStorage = Rc<dyn KeyValueStorage>;

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Rc<S> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

/// Bytes used by a set of entries (keys and values both count)
pub(crate) fn used_bytes(entries: &BTreeMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// Check that writing `value` under `key` keeps `entries` within `limit`
pub(crate) fn check_quota(
    entries: &BTreeMap<String, String>,
    key: &str,
    value: &str,
    limit: Option<usize>,
) -> Result<()> {
    let Some(limit) = limit else {
        return Ok(());
    };

    let replaced = entries.get(key).map(|old| key.len() + old.len()).unwrap_or(0);
    let needed = used_bytes(entries) - replaced + key.len() + value.len();
    if needed > limit {
        return Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            needed,
            limit,
        });
    }
    Ok(())
}

// =============================================================================
// Backend selection
// =============================================================================

/// Which storage backend to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// JSON file under the config directory
    #[default]
    File,
    /// In-memory only; nothing survives the process
    Memory,
    /// Browser `localStorage` (falls back to [`NoopStorage`] off the web)
    Web,
    /// Storage disabled; stores run on defaults
    Disabled,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::File => "file",
            Backend::Memory => "memory",
            Backend::Web => "web",
            Backend::Disabled => "none",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Backend::File),
            "memory" | "mem" => Ok(Backend::Memory),
            "web" | "local-storage" => Ok(Backend::Web),
            "none" | "disabled" | "off" => Ok(Backend::Disabled),
            other => Err(format!(
                "unknown storage backend '{}' (expected file, memory, web or none)",
                other
            )),
        }
    }
}

/// Where and how to persist store values
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Backend to construct
    pub backend: Backend,
    /// Directory holding the storage file (defaults to `<config dir>/<app_name>`)
    pub dir: Option<PathBuf>,
    /// Application name used for the default directory
    pub app_name: String,
    /// Storage file name inside `dir`
    pub file_name: String,
    /// Optional byte limit over all keys and values
    pub quota_bytes: Option<usize>,
}

/// Default file name for [`FileStorage`]
pub const DEFAULT_FILE_NAME: &str = "storage.json";

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            dir: None,
            app_name: "persist-dispatch".to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            quota_bytes: None,
        }
    }
}

impl StorageConfig {
    /// Create a config for `app_name` with default settings
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Self::default()
        }
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn quota_bytes(mut self, limit: usize) -> Self {
        self.quota_bytes = Some(limit);
        self
    }

    /// Resolve the storage file path
    ///
    /// Returns `None` when no directory was given and the platform config
    /// directory cannot be determined (e.g. `HOME` is unset).
    pub fn file_path(&self) -> Option<PathBuf> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => dirs::config_dir()?.join(&self.app_name),
        };
        Some(dir.join(&self.file_name))
    }
}

/// Build the storage backend described by `config`
///
/// Never fails: when the requested backend cannot be used the result is a
/// [`NoopStorage`], so stores silently run on their defaults. Use
/// [`try_detect`] to learn about an unreadable storage file instead.
pub fn detect(config: &StorageConfig) -> SharedStorage {
    try_detect(config).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Cannot open storage, storage disabled");
        Rc::new(NoopStorage)
    })
}

/// Like [`detect`], but report a storage file that exists and cannot be used
///
/// A missing platform directory or browser storage still yields
/// [`NoopStorage`]; only an unreadable or corrupt file is an error.
pub fn try_detect(config: &StorageConfig) -> Result<SharedStorage> {
    match config.backend {
        Backend::Memory => Ok(Rc::new(MemoryStorage::with_quota(config.quota_bytes))),
        Backend::Disabled => Ok(Rc::new(NoopStorage)),
        Backend::File => {
            let Some(path) = config.file_path() else {
                tracing::debug!("No config directory available, storage disabled");
                return Ok(Rc::new(NoopStorage));
            };
            let storage = FileStorage::open_with_quota(&path, config.quota_bytes)?;
            tracing::debug!(path = %path.display(), "Opened file storage");
            Ok(Rc::new(storage))
        }
        Backend::Web => Ok(web_storage()),
    }
}

/// Erase everything the backend described by `config` has stored
///
/// For the file backend the file is deleted without being read, which is the
/// way out of a corrupt storage file.
pub fn reset(config: &StorageConfig) -> Result<()> {
    match config.backend {
        Backend::File => {
            let Some(path) = config.file_path() else {
                return Ok(());
            };
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Removed storage file");
                    Ok(())
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::io(path, e)),
            }
        }
        _ => try_detect(config)?.clear(),
    }
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
fn web_storage() -> SharedStorage {
    match WebStorage::local() {
        Some(storage) => Rc::new(storage),
        None => {
            tracing::debug!("window.localStorage is not available, storage disabled");
            Rc::new(NoopStorage)
        }
    }
}

#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
fn web_storage() -> SharedStorage {
    tracing::debug!("Web storage requires wasm32 and the `web` feature, storage disabled");
    Rc::new(NoopStorage)
}
