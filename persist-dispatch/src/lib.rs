//! persist-dispatch: Persisted, observable state for Rust apps
//!
//! Small pieces of user state (favorites, preferences) that load from
//! key-value storage on startup, notify subscribers on every change, and
//! write themselves back. Mutations go through dispatched actions and a
//! reducer, like Redux/Elm.
//!
//! # Example
//! ```ignore
//! use persist_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(namespace = "counter")]
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
//! store.dispatch(CounterAction::Increment);
//! ```

// Re-export everything from core
pub use persist_dispatch_core::*;

// Re-export derive macros
pub use persist_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use persist_dispatch_core::{Action, ActionSummary, KeyValueStorage};

    // Persisted values
    pub use persist_dispatch_core::{
        PersistOptions, PersistentObservable, SharedStorage, StorageError, Subscription,
    };

    // Storage selection
    pub use persist_dispatch_core::storage::{self, Backend, StorageConfig};

    // Store
    pub use persist_dispatch_core::{
        LoggingMiddleware, Middleware, Reducer, Store, StoreWithMiddleware,
    };

    // Derive macros
    pub use persist_dispatch_macros::Action;
}
