//! Favorite locations, as an ordered list of location ids

use persist_dispatch::{
    Action, LoggingMiddleware, PersistOptions, PersistentObservable, SharedStorage,
    StoreWithMiddleware, Subscription,
};
use std::collections::HashSet;
use std::fmt;

#[derive(Action, Clone, Debug, PartialEq)]
#[action(namespace = "favorites")]
pub enum FavoritesAction {
    /// Append an id (duplicates are kept)
    Add(String),
    /// Drop every entry equal to the id
    Remove(String),
    /// Remove the id if present, otherwise append it
    Toggle(String),
    /// Move the entry at `from` to position `to`
    Move { from: usize, to: usize },
    Clear,
    Replace(Vec<String>),
}

pub fn reducer(state: &mut Vec<String>, action: FavoritesAction) -> bool {
    match action {
        FavoritesAction::Add(id) => {
            state.push(id);
            true
        }
        FavoritesAction::Remove(id) => {
            let before = state.len();
            state.retain(|f| *f != id);
            state.len() != before
        }
        FavoritesAction::Toggle(id) => {
            if state.contains(&id) {
                state.retain(|f| *f != id);
            } else {
                state.push(id);
            }
            true
        }
        FavoritesAction::Move { from, to } => {
            if from == to || from >= state.len() || to >= state.len() {
                return false;
            }
            let id = state.remove(from);
            state.insert(to, id);
            true
        }
        FavoritesAction::Clear => {
            let changed = !state.is_empty();
            state.clear();
            changed
        }
        FavoritesAction::Replace(ids) => {
            if *state == ids {
                return false;
            }
            *state = ids;
            true
        }
    }
}

/// Persisted favorites store, mirrored under [`FavoritesStore::KEY`]
#[derive(Clone)]
pub struct FavoritesStore {
    store: StoreWithMiddleware<Vec<String>, FavoritesAction, LoggingMiddleware>,
}

impl FavoritesStore {
    pub const KEY: &'static str = "favorites";

    /// Load favorites from `storage`, starting empty when nothing usable is stored
    pub fn init(storage: SharedStorage) -> Self {
        Self::with_options(storage, PersistOptions::default())
    }

    pub fn with_options(storage: SharedStorage, options: PersistOptions) -> Self {
        let state = PersistentObservable::with_options(Self::KEY, Vec::new(), storage, options);
        Self {
            store: StoreWithMiddleware::new(state, reducer, LoggingMiddleware),
        }
    }

    /// Apply an action; returns whether the list changed
    pub fn dispatch(&mut self, action: FavoritesAction) -> bool {
        self.store.dispatch(action)
    }

    /// Apply an action, reporting a failed storage write
    pub fn try_dispatch(&mut self, action: FavoritesAction) -> persist_dispatch::Result<bool> {
        self.store.try_dispatch(action)
    }

    pub fn get(&self) -> Vec<String> {
        self.store.state()
    }

    /// Replace the whole list, then persist and notify even if nothing changed
    pub fn set(&self, ids: Vec<String>) {
        self.observable().set(ids);
    }

    pub fn subscribe(&self, callback: impl FnMut(&Vec<String>) + 'static) -> Subscription {
        self.store.subscribe(callback)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.store.with_state(|ids| ids.iter().any(|f| f == id))
    }

    pub fn len(&self) -> usize {
        self.store.with_state(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.store.with_state(Vec::is_empty)
    }

    /// Favorites without repeats, in order of first appearance
    pub fn ids(&self) -> Vec<String> {
        self.store.with_state(|ids| {
            let mut seen = HashSet::new();
            ids.iter()
                .filter(|id| seen.insert(id.as_str()))
                .cloned()
                .collect()
        })
    }

    /// The underlying persisted value
    pub fn observable(&self) -> &PersistentObservable<Vec<String>> {
        self.store.store().observable()
    }
}

impl fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FavoritesStore")
            .field(self.observable())
            .finish()
    }
}
