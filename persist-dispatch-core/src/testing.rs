//! Test utilities for persist-dispatch applications
//!
//! - [`Recorder`]: a subscriber that captures every value delivered to it
//! - [`StoreHarness`]: shared in-memory storage with helpers to seed it and to
//!   build values over it; building a second value for the same key is the
//!   "reload the page" step of a round-trip test
//! - Assertion macros for checking delivered values
//!
//! # Example
//!
//! ```
//! use persist_dispatch_core::testing::{Recorder, StoreHarness};
//!
//! let harness = StoreHarness::with_items([("favorites", r#"["paris"]"#)]);
//! let favorites = harness.observable("favorites", Vec::<String>::new());
//!
//! let recorder = Recorder::new();
//! let _sub = favorites.subscribe(recorder.callback());
//! favorites.set(vec!["paris".into(), "tokyo".into()]);
//!
//! assert_eq!(recorder.len(), 2);
//! assert_eq!(harness.observable("favorites", Vec::<String>::new()).get(), vec!["paris", "tokyo"]);
//! ```

use crate::observable::PersistentObservable;
use crate::storage::{KeyValueStorage, MemoryStorage, SharedStorage};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Captures every value a subscription delivers
///
/// Clones share the same log, so keep one in the test and move another into
/// the callback (or use [`callback`](Self::callback)).
#[derive(Debug)]
pub struct Recorder<T> {
    values: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            values: Rc::clone(&self.values),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            values: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T: Clone + 'static> Recorder<T> {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// A subscriber callback that records into this recorder
    pub fn callback(&self) -> impl FnMut(&T) + 'static {
        let values = Rc::clone(&self.values);
        move |value: &T| values.borrow_mut().push(value.clone())
    }

    /// Every value recorded so far, oldest first
    pub fn values(&self) -> Vec<T> {
        self.values.borrow().clone()
    }

    /// Most recently recorded value
    pub fn last(&self) -> Option<T> {
        self.values.borrow().last().cloned()
    }

    /// Number of deliveries
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Whether nothing was delivered
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    /// Take all recorded values, leaving the recorder empty
    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.values.borrow_mut())
    }
}

/// In-memory storage shared by the values under test
#[derive(Debug, Clone, Default)]
pub struct StoreHarness {
    storage: Rc<MemoryStorage>,
}

impl StoreHarness {
    /// Harness over empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Harness over storage seeded with raw key/value pairs
    pub fn with_items<K, V, I>(items: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            storage: Rc::new(MemoryStorage::with_items(items)),
        }
    }

    /// Harness over storage limited to `quota` bytes
    pub fn with_quota(quota: usize) -> Self {
        Self {
            storage: Rc::new(MemoryStorage::with_quota(Some(quota))),
        }
    }

    /// The storage as a shareable handle
    pub fn storage(&self) -> SharedStorage {
        self.storage.clone()
    }

    /// The concrete memory storage (for write counts and snapshots)
    pub fn memory(&self) -> &MemoryStorage {
        &self.storage
    }

    /// Raw text stored under `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.storage.snapshot().get(key).cloned()
    }

    /// Every stored entry
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.storage.snapshot()
    }

    /// Overwrite the raw text under `key`, bypassing any store
    pub fn put_raw(&self, key: &str, raw: &str) {
        // Memory storage only fails on quota, which tests set deliberately
        if let Err(e) = self.storage.set_item(key, raw) {
            panic!("put_raw({:?}) failed: {}", key, e);
        }
    }

    /// Load a value from whatever is currently stored under `key`
    pub fn observable<T>(&self, key: &str, default: T) -> PersistentObservable<T>
    where
        T: Clone + Serialize + DeserializeOwned + 'static,
    {
        PersistentObservable::init(key, default, self.storage())
    }
}

/// Assert that some delivered value matches a pattern.
///
/// # Example
///
/// ```ignore
/// use persist_dispatch::assert_notified;
///
/// assert_notified!(recorder.values(), v if v.len() == 2);
/// ```
#[macro_export]
macro_rules! assert_notified {
    ($values:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $values.iter().any(|v| matches!(v, $pattern $(if $guard)?)),
            "Expected a notification matching `{}`, but got: {:?}",
            stringify!($pattern),
            $values
        );
    };
}

/// Assert that no delivered value matches a pattern.
#[macro_export]
macro_rules! assert_not_notified {
    ($values:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$values.iter().any(|v| matches!(v, $pattern $(if $guard)?)),
            "Expected NO notification matching `{}`, but got: {:?}",
            stringify!($pattern),
            $values
        );
    };
}

/// Count how many delivered values match a pattern.
#[macro_export]
macro_rules! count_notified {
    ($values:expr, $pattern:pat $(if $guard:expr)?) => {
        $values
            .iter()
            .filter(|v| matches!(*v, $pattern $(if $guard)?))
            .count()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_captures_in_order() {
        let harness = StoreHarness::new();
        let counter = harness.observable("counter", 0u32);
        let recorder = Recorder::new();

        let _sub = counter.subscribe(recorder.callback());
        counter.set(1);
        counter.set(2);

        assert_eq!(recorder.values(), vec![0, 1, 2]);
        assert_eq!(recorder.last(), Some(2));
        assert_eq!(recorder.drain(), vec![0, 1, 2]);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_harness_round_trip_and_raw() {
        let harness = StoreHarness::new();
        harness.observable("counter", 0u32).set(7);

        assert_eq!(harness.raw("counter").as_deref(), Some("7"));
        assert_eq!(harness.observable("counter", 0u32).get(), 7);
    }

    #[test]
    fn test_put_raw_seeds_next_load() {
        let harness = StoreHarness::new();
        harness.put_raw("counter", "41");
        assert_eq!(harness.observable("counter", 0u32).get(), 41);
    }

    #[test]
    fn test_notification_macros() {
        let values = vec![1, 5, 10];
        assert_notified!(values, 5);
        assert_notified!(values, v if *v > 8);
        assert_not_notified!(values, 2);
        assert_eq!(count_notified!(values, v if *v >= 5), 2);
        assert_eq!(count_notified!(values, 10), 1);
    }
}
