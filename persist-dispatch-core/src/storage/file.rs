//! File-backed storage
//!
//! Keeps every key in a single JSON object on disk, the native counterpart of
//! the browser's `localStorage`. Entries are cached in memory and every change
//! is written through to the file before it becomes visible.

use super::{check_quota, KeyValueStorage};
use crate::error::{Result, StorageError};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// JSON-file storage backend
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`
    ///
    /// A missing or empty file is an empty storage. A file that exists but is
    /// not a JSON object of strings is reported as [`StorageError::Corrupt`]
    /// and left untouched.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_quota(path, None)
    }

    /// Like [`open`](Self::open), limiting stored data to `quota` bytes
    pub fn open_with_quota(path: impl AsRef<Path>, quota: Option<usize>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = read_entries(&path)?;
        Ok(Self {
            path,
            entries: RefCell::new(entries),
            quota,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `entries` to disk, then make them the cached state
    fn commit(&self, entries: BTreeMap<String, String>) -> Result<()> {
        write_entries(&self.path, &entries)?;
        *self.entries.borrow_mut() = entries;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut next = self.entries.borrow().clone();
        check_quota(&next, key, value, self.quota)?;
        next.insert(key.to_string(), value.to_string());
        self.commit(next)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        if !self.entries.borrow().contains_key(key) {
            return Ok(());
        }
        let mut next = self.entries.borrow().clone();
        next.remove(key);
        self.commit(next)
    }

    fn clear(&self) -> Result<()> {
        self.commit(BTreeMap::new())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(StorageError::io(path, e)),
    };

    // Empty file is treated as non-existent
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
    }

    let content = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // Write next to the target and rename so a crash never leaves half a file
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).map_err(|e| StorageError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StorageError::io(path, e))
}
