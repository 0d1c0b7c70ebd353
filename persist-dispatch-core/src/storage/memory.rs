//! In-memory storage backend

use super::{check_quota, KeyValueStorage};
use crate::error::Result;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Storage that keeps everything in a map for the life of the process
///
/// Behaves like a real backend (it reports itself available and honours an
/// optional quota), which makes it the backend of choice for tests. It also
/// counts successful writes so tests can assert that nothing was persisted.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
    quota: Option<usize>,
    writes: Cell<usize>,
}

impl MemoryStorage {
    /// Create an empty storage without a quota
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty storage limited to `quota` bytes (if any)
    pub fn with_quota(quota: Option<usize>) -> Self {
        Self {
            quota,
            ..Self::default()
        }
    }

    /// Create a storage pre-seeded with raw key/value pairs
    pub fn with_items<K, V, I>(items: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let entries = items
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RefCell::new(entries),
            ..Self::default()
        }
    }

    /// Copy of every stored entry
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }

    /// Number of successful `set_item` calls
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.borrow_mut();
        check_quota(&entries, key, value, self.quota)?;
        entries.insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.borrow_mut().clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}
