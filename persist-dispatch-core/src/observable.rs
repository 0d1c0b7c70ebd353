//! Observable values mirrored into persistent storage
//!
//! A [`PersistentObservable`] holds one value, notifies subscribers whenever
//! it is replaced, and writes every new value to a [`KeyValueStorage`] under a
//! fixed key. On construction the value is seeded from that key.
//!
//! # Example
//!
//! ```
//! use persist_dispatch_core::storage::{KeyValueStorage, MemoryStorage, SharedStorage};
//! use persist_dispatch_core::PersistentObservable;
//! use std::rc::Rc;
//!
//! let storage: SharedStorage =
//!     Rc::new(MemoryStorage::with_items([("favorites", r#"["paris","tokyo"]"#)]));
//!
//! let favorites = PersistentObservable::init("favorites", Vec::<String>::new(), storage.clone());
//! assert_eq!(favorites.get(), vec!["paris", "tokyo"]);
//!
//! favorites.set(vec!["paris".to_string()]);
//! assert_eq!(storage.get_item("favorites").unwrap().as_deref(), Some(r#"["paris"]"#));
//! ```

use crate::error::{Result, StorageError};
use crate::storage::{KeyValueStorage, SharedStorage};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Options controlling how a [`PersistentObservable`] talks to storage
#[derive(Debug, Clone, Copy)]
pub struct PersistOptions {
    /// Write the initial value back to storage right after loading.
    ///
    /// This replaces unparseable stored text with the default, so the next
    /// load does not have to fall back again.
    pub sync_on_load: bool,
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self { sync_on_load: true }
    }
}

type Callback<T> = RefCell<Box<dyn FnMut(&T)>>;

struct Subscriber<T> {
    id: u64,
    active: Cell<bool>,
    callback: Callback<T>,
}

struct Shared<T> {
    key: String,
    storage: SharedStorage,
    value: RefCell<T>,
    subscribers: RefCell<Vec<Rc<Subscriber<T>>>>,
    next_id: Cell<u64>,
    /// Bumped on every `set`; lets an outer notification pass stop early
    /// once a subscriber has published a newer value.
    version: Cell<u64>,
}

impl<T> Shared<T> {
    fn remove_subscriber(&self, id: u64) {
        let mut subscribers = self.subscribers.borrow_mut();
        if let Some(pos) = subscribers.iter().position(|s| s.id == id) {
            subscribers.remove(pos).active.set(false);
        }
    }
}

/// A value that notifies subscribers on change and persists itself
///
/// Cloning produces another handle to the same value, so a store can be
/// handed to every part of the UI that needs it. Handles are single-threaded
/// (`!Send`): subscribers run synchronously inside [`set`](Self::set), in
/// subscription order, before `set` returns.
pub struct PersistentObservable<T> {
    shared: Rc<Shared<T>>,
}

impl<T> Clone for PersistentObservable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentObservable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentObservable")
            .field("key", &self.shared.key)
            .field("value", &*self.shared.value.borrow())
            .field("subscribers", &self.shared.subscribers.borrow().len())
            .field("storage_available", &self.shared.storage.is_available())
            .finish()
    }
}

impl<T> PersistentObservable<T>
where
    T: Clone + Serialize + DeserializeOwned + 'static,
{
    /// Load the value stored under `key`, or use `default`
    ///
    /// Falls back to `default` when the key is missing, holds blank or
    /// unparseable text, or when `storage` is unavailable. None of these are
    /// errors.
    pub fn init(key: impl Into<String>, default: T, storage: SharedStorage) -> Self {
        Self::with_options(key, default, storage, PersistOptions::default())
    }

    /// Like [`init`](Self::init) with explicit [`PersistOptions`]
    pub fn with_options(
        key: impl Into<String>,
        default: T,
        storage: SharedStorage,
        options: PersistOptions,
    ) -> Self {
        let key = key.into();
        let value = load(&key, &storage).unwrap_or(default);

        let observable = Self {
            shared: Rc::new(Shared {
                key,
                storage,
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                version: Cell::new(0),
            }),
        };

        if options.sync_on_load {
            let initial = observable.get();
            if let Err(e) = observable.persist(&initial) {
                tracing::warn!(key = %observable.key(), error = %e, "Failed to write initial value");
            }
        }

        observable
    }

    /// Storage key this value is mirrored under
    pub fn key(&self) -> &str {
        &self.shared.key
    }

    /// Storage backend this value is mirrored into
    pub fn storage(&self) -> &SharedStorage {
        &self.shared.storage
    }

    /// Current value
    pub fn get(&self) -> T {
        self.shared.value.borrow().clone()
    }

    /// Borrow the current value without cloning it
    ///
    /// Calling [`set`](Self::set) from inside `f` panics.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.shared.value.borrow())
    }

    /// Replace the value, persist it and notify subscribers
    ///
    /// Storage write failures (quota, I/O) are logged and otherwise ignored:
    /// the in-memory value is the source of truth for the running session.
    pub fn set(&self, value: T) {
        if let Err(e) = self.try_set(value) {
            tracing::warn!(key = %self.key(), error = %e, "Failed to persist value");
        }
    }

    /// Like [`set`](Self::set), but report a failed storage write
    ///
    /// The value is replaced and subscribers are notified even when the
    /// write fails.
    pub fn try_set(&self, value: T) -> Result<()> {
        let version = self.shared.version.get().wrapping_add(1);
        self.shared.version.set(version);
        *self.shared.value.borrow_mut() = value.clone();

        let persisted = self.persist(&value);
        self.notify(&value, version);
        persisted
    }

    /// Mutate the value in place (field-wise update), then [`set`](Self::set) it
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    /// Register `callback` for value changes
    ///
    /// The callback is invoked immediately with the current value, then after
    /// every [`set`](Self::set). Delivery stops when the returned
    /// [`Subscription`] is dropped or [`unsubscribed`](Subscription::unsubscribe).
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id + 1);

        let subscriber = Rc::new(Subscriber {
            id,
            active: Cell::new(true),
            callback: RefCell::new(Box::new(callback)),
        });
        self.shared
            .subscribers
            .borrow_mut()
            .push(Rc::clone(&subscriber));

        let current = self.get();
        if let Ok(mut callback) = subscriber.callback.try_borrow_mut() {
            callback(&current);
        }

        let weak: Weak<Shared<T>> = Rc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.remove_subscriber(id);
            }
        })
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.borrow().len()
    }

    fn persist(&self, value: &T) -> Result<()> {
        let storage = &self.shared.storage;
        if !storage.is_available() {
            return Ok(());
        }

        let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: self.shared.key.clone(),
            source,
        })?;
        storage.set_item(&self.shared.key, &raw)
    }

    fn notify(&self, value: &T, version: u64) {
        // Snapshot so callbacks may subscribe or unsubscribe while we iterate
        let subscribers: Vec<_> = self.shared.subscribers.borrow().clone();

        for subscriber in subscribers {
            if self.shared.version.get() != version {
                // A callback called `set`; the newer value has been delivered
                break;
            }
            if !subscriber.active.get() {
                continue;
            }
            match subscriber.callback.try_borrow_mut() {
                Ok(mut callback) => callback(value),
                Err(_) => {
                    tracing::trace!(key = %self.key(), "Skipping subscriber that is already running");
                }
            }
        }
    }
}

fn load<T: DeserializeOwned>(key: &str, storage: &SharedStorage) -> Option<T> {
    if !storage.is_available() {
        tracing::debug!(key = %key, "Storage unavailable, using default");
        return None;
    }

    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Failed to read stored value, using default");
            return None;
        }
    };

    if raw.trim().is_empty() {
        return None;
    }

    match serde_json::from_str(&raw) {
        Ok(value) => {
            tracing::debug!(key = %key, "Loaded stored value");
            Some(value)
        }
        Err(e) => {
            tracing::debug!(key = %key, error = %e, "Stored value is malformed, using default");
            None
        }
    }
}

/// Handle returned by [`PersistentObservable::subscribe`]
///
/// Dropping the handle unsubscribes. Use [`detach`](Self::detach) to keep the
/// callback registered for as long as the observable lives.
#[must_use = "dropping a Subscription unsubscribes immediately; call `detach()` to keep it"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop receiving notifications
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the subscription alive without holding the handle
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
