//! Browser `localStorage` backend

use super::KeyValueStorage;
use crate::error::{Result, StorageError};

/// `window.localStorage` wrapper
pub struct WebStorage {
    storage: web_sys::Storage,
}

impl WebStorage {
    /// Get the window's local storage
    ///
    /// Returns `None` outside a window context, or when the browser denies
    /// access (private mode, disabled cookies).
    pub fn local() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok().flatten()?;
        Some(Self { storage })
    }
}

fn js_error(context: &str, err: impl std::fmt::Debug) -> StorageError {
    StorageError::Unavailable(format!("{}: {:?}", context, err))
}

impl KeyValueStorage for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| js_error("getItem failed", e))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        // The browser throws QuotaExceededError here; it carries no sizes
        self.storage
            .set_item(key, value)
            .map_err(|e| js_error(&format!("setItem('{}') failed", key), e))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| js_error("removeItem failed", e))
    }

    fn clear(&self) -> Result<()> {
        self.storage.clear().map_err(|e| js_error("clear failed", e))
    }

    fn keys(&self) -> Result<Vec<String>> {
        let len = self
            .storage
            .length()
            .map_err(|e| js_error("length failed", e))?;
        let mut keys = Vec::with_capacity(len as usize);
        for i in 0..len {
            if let Some(key) = self.storage.key(i).map_err(|e| js_error("key failed", e))? {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}
