//! Persisted state store with reducer pattern

use crate::error::{Result, StorageError};
use crate::observable::{PersistentObservable, Subscription};
use crate::Action;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// A reducer function that handles actions and mutates state
///
/// Returns `true` if the state changed and must be published and persisted.
pub type Reducer<S, A> = fn(&mut S, A) -> bool;

/// Persisted state container with Redux-like reducer pattern
///
/// The store owns a [`PersistentObservable`] and funnels every mutation
/// through `dispatch`. A dispatch that the reducer reports as a no-op neither
/// notifies subscribers nor touches storage.
///
/// Cloning a store yields another handle to the same state.
///
/// # Type Parameters
/// * `S` - The persisted state type
/// * `A` - The action type (must implement `Action`)
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum CounterAction {
///     Increment,
///     Decrement,
/// }
///
/// fn reducer(state: &mut i32, action: CounterAction) -> bool {
///     match action {
///         CounterAction::Increment => {
///             *state += 1;
///             true
///         }
///         CounterAction::Decrement => {
///             *state -= 1;
///             true
///         }
///     }
/// }
///
/// let counter = PersistentObservable::init("counter", 0, storage);
/// let store = Store::new(counter, reducer);
/// store.dispatch(CounterAction::Increment);
/// assert_eq!(store.state(), 1);
/// ```
pub struct Store<S, A: Action> {
    state: PersistentObservable<S>,
    reducer: Reducer<S, A>,
    _marker: PhantomData<A>,
}

impl<S, A: Action> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            reducer: self.reducer,
            _marker: PhantomData,
        }
    }
}

impl<S, A> Store<S, A>
where
    S: Clone + Serialize + DeserializeOwned + 'static,
    A: Action,
{
    /// Create a new store over a persisted value and a reducer
    pub fn new(state: PersistentObservable<S>, reducer: Reducer<S, A>) -> Self {
        Self {
            state,
            reducer,
            _marker: PhantomData,
        }
    }

    /// Dispatch an action to the store
    ///
    /// The reducer runs on a copy of the current state. Returns `true` if the
    /// state changed, in which case it has been published and persisted.
    pub fn dispatch(&self, action: A) -> bool {
        let mut next = self.state.get();
        let changed = (self.reducer)(&mut next, action);
        if changed {
            self.state.set(next);
        }
        changed
    }

    /// Like [`dispatch`](Self::dispatch), but report a failed storage write
    ///
    /// Subscribers are notified of the new state either way.
    pub fn try_dispatch(&self, action: A) -> Result<bool> {
        let mut next = self.state.get();
        if !(self.reducer)(&mut next, action) {
            return Ok(false);
        }
        self.state.try_set(next)?;
        Ok(true)
    }

    /// Get a copy of the current state
    pub fn state(&self) -> S {
        self.state.get()
    }

    /// Borrow the current state
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.state.with(f)
    }

    /// Subscribe to state changes (see [`PersistentObservable::subscribe`])
    pub fn subscribe(&self, callback: impl FnMut(&S) + 'static) -> Subscription {
        self.state.subscribe(callback)
    }

    /// The underlying persisted value
    ///
    /// Use this sparingly - prefer dispatching actions for state changes.
    /// Setting the value directly bypasses the reducer.
    pub fn observable(&self) -> &PersistentObservable<S> {
        &self.state
    }
}

/// A [`Store`] whose dispatches pass through a [`Middleware`]
///
/// Every dispatch goes through the fallible path so the middleware learns
/// about storage write failures.
pub struct StoreWithMiddleware<S, A: Action, M: Middleware<S, A>> {
    store: Store<S, A>,
    middleware: M,
}

impl<S, A: Action, M: Middleware<S, A> + Clone> Clone for StoreWithMiddleware<S, A, M> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            middleware: self.middleware.clone(),
        }
    }
}

impl<S, A, M> StoreWithMiddleware<S, A, M>
where
    S: Clone + Serialize + DeserializeOwned + 'static,
    A: Action,
    M: Middleware<S, A>,
{
    pub fn new(state: PersistentObservable<S>, reducer: Reducer<S, A>, middleware: M) -> Self {
        Self {
            store: Store::new(state, reducer),
            middleware,
        }
    }

    /// Dispatch an action, logging a failed storage write
    ///
    /// Returns `true` if the state changed, whether or not it could be persisted.
    pub fn dispatch(&mut self, action: A) -> bool {
        let name = action.name();
        match self.try_dispatch(action) {
            Ok(changed) => changed,
            Err(e) => {
                tracing::warn!(action = %name, error = %e, "Failed to persist state");
                true
            }
        }
    }

    /// Dispatch an action, returning a failed storage write to the caller
    ///
    /// Middleware sees the same outcome in its `after` hook.
    pub fn try_dispatch(&mut self, action: A) -> Result<bool> {
        self.store
            .with_state(|state| self.middleware.before(&action, state));
        let result = self.store.try_dispatch(action.clone());
        self.store.with_state(|state| {
            self.middleware
                .after(&action, state, result.as_ref().map(|changed| *changed))
        });
        result
    }

    pub fn state(&self) -> S {
        self.store.state()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.store.with_state(f)
    }

    pub fn subscribe(&self, callback: impl FnMut(&S) + 'static) -> Subscription {
        self.store.subscribe(callback)
    }

    /// The wrapped store
    pub fn store(&self) -> &Store<S, A> {
        &self.store
    }
}

/// Hooks around every [`StoreWithMiddleware`] dispatch
///
/// `after` receives `Ok(changed)` once the reducer ran and any change was
/// persisted, or the storage error when persisting failed. In both cases
/// `state` is the value subscribers were given.
pub trait Middleware<S, A: Action> {
    fn before(&mut self, _action: &A, _state: &S) {}

    fn after(&mut self, action: &A, state: &S, outcome: std::result::Result<bool, &StorageError>);
}

/// Traces each dispatch at `debug`
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl<S, A: Action> Middleware<S, A> for LoggingMiddleware {
    fn after(
        &mut self,
        action: &A,
        _state: &S,
        outcome: std::result::Result<bool, &StorageError>,
    ) {
        match outcome {
            Ok(changed) => tracing::debug!(action = %action.name(), changed, "Dispatched"),
            Err(e) => tracing::debug!(action = %action.name(), error = %e, "Dispatched, not persisted"),
        }
    }
}
