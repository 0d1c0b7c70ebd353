//! Core traits and types for persist-dispatch
//!
//! This crate provides the building blocks for small pieces of client-side
//! state that survive restarts: a value is loaded from key-value storage on
//! startup, observed by the UI, and written back on every change.
//!
//! # Core Concepts
//!
//! - **KeyValueStorage**: `localStorage`-shaped string storage with file,
//!   memory, no-op and browser backends
//! - **PersistentObservable**: a value that notifies subscribers and
//!   persists itself on every `set`
//! - **Action**: Events that describe state changes
//! - **Store**: Reducer-driven wrapper over a persisted value
//! - **Middleware**: Hooks around each dispatch (logging, auditing)
//!
//! # Basic Example
//!
//! ```ignore
//! use persist_dispatch_core::prelude::*;
//! use std::rc::Rc;
//!
//! #[derive(Action, Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//!     Reset,
//! }
//!
//! fn reducer(state: &mut u32, action: CounterAction) -> bool {
//!     match action {
//!         CounterAction::Increment => { *state += 1; true }
//!         CounterAction::Reset => std::mem::take(state) != 0,
//!     }
//! }
//!
//! let storage = storage::detect(&StorageConfig::new("my-app"));
//! let store = Store::new(PersistentObservable::init("counter", 0, storage), reducer);
//!
//! let _sub = store.subscribe(|count| println!("count is now {count}"));
//! store.dispatch(CounterAction::Increment);
//! ```
//!
//! # Storage Availability
//!
//! Backends are selected once, when the application starts. If no real
//! storage can be opened, [`storage::detect`] returns a
//! [`NoopStorage`](storage::NoopStorage) and every value quietly runs on its
//! default. Unreadable stored text for a single key also falls back to the
//! default. Neither case is surfaced as an error. A storage file that cannot
//! be parsed at all is reported by [`storage::try_detect`], and
//! [`storage::reset`] removes it.

pub mod action;
pub mod error;
pub mod observable;
pub mod storage;
pub mod store;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionSummary};

// Error exports
pub use error::{Result, StorageError};

// Observable exports
pub use observable::{PersistOptions, PersistentObservable, Subscription};

// Storage exports
pub use storage::{
    detect, try_detect, Backend, FileStorage, KeyValueStorage, MemoryStorage, NoopStorage, SharedStorage,
    StorageConfig,
};
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use storage::WebStorage;

// Store exports
pub use store::{
    LoggingMiddleware, Middleware, Reducer, Store, StoreWithMiddleware,
};

// Testing exports
pub use testing::{Recorder, StoreHarness};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionSummary};
    pub use crate::error::StorageError;
    pub use crate::observable::{PersistOptions, PersistentObservable, Subscription};
    pub use crate::storage::{
        self, Backend, KeyValueStorage, SharedStorage, StorageConfig,
    };
    pub use crate::store::{
        LoggingMiddleware, Middleware, Reducer, Store, StoreWithMiddleware,
    };
}
