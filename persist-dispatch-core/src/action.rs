//! Action trait for type-safe state mutations

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to a [`Store`](crate::Store)
///
/// Actions describe an intended change to a persisted value. They should be:
/// - Clone: Actions may be logged or handed to middleware before the reducer
/// - Debug: For logging
///
/// Stores are single-threaded, so unlike the state they change, actions do
/// not need to be `Send`.
///
/// Use `#[derive(Action)]` from `persist-dispatch-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Concise, human-readable description of an action for log output
///
/// The default implementation falls back to `Debug`. Override it for actions
/// that carry large payloads (for example a full replacement value).
pub trait ActionSummary: Action {
    /// One-line summary of this action
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}
