//! User preferences: dark mode, temperature unit, forecast length

use persist_dispatch::{
    Action, LoggingMiddleware, PersistOptions, PersistentObservable, SharedStorage,
    StoreWithMiddleware, Subscription,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest forecast the dashboard can show
pub const MAX_FORECAST_DAYS: u32 = 16;

/// Temperature unit preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TempUnit {
    #[default]
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TempUnit {
    pub fn toggle(&self) -> Self {
        match self {
            TempUnit::Celsius => TempUnit::Fahrenheit,
            TempUnit::Fahrenheit => TempUnit::Celsius,
        }
    }

    /// Format a Celsius reading in this unit
    pub fn format(&self, celsius: f32) -> String {
        match self {
            TempUnit::Celsius => format!("{:.1}°C", celsius),
            TempUnit::Fahrenheit => format!("{:.1}°F", celsius * 9.0 / 5.0 + 32.0),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TempUnit::Celsius => "C",
            TempUnit::Fahrenheit => "F",
        }
    }
}

impl fmt::Display for TempUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for TempUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "celsius" => Ok(TempUnit::Celsius),
            "f" | "fahrenheit" => Ok(TempUnit::Fahrenheit),
            other => Err(format!("unknown unit '{}' (expected C or F)", other)),
        }
    }
}

/// Persisted preferences
///
/// Stored as `{"darkMode": false, "unit": "C", "forecastDays": 5}`. Fields
/// missing from stored text take their default values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub dark_mode: bool,
    pub unit: TempUnit,
    pub forecast_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            unit: TempUnit::Celsius,
            forecast_days: 5,
        }
    }
}

#[derive(Action, Clone, Debug, PartialEq)]
#[action(namespace = "settings")]
pub enum SettingsAction {
    SetDarkMode(bool),
    ToggleDarkMode,
    SetUnit(TempUnit),
    ToggleUnit,
    /// Clamped to `1..=MAX_FORECAST_DAYS`
    SetForecastDays(u32),
    /// Back to the defaults
    Reset,
    Replace(Settings),
}

pub fn reducer(state: &mut Settings, action: SettingsAction) -> bool {
    match action {
        SettingsAction::SetDarkMode(on) => {
            let changed = state.dark_mode != on;
            state.dark_mode = on;
            changed
        }
        SettingsAction::ToggleDarkMode => {
            state.dark_mode = !state.dark_mode;
            true
        }
        SettingsAction::SetUnit(unit) => {
            let changed = state.unit != unit;
            state.unit = unit;
            changed
        }
        SettingsAction::ToggleUnit => {
            state.unit = state.unit.toggle();
            true
        }
        SettingsAction::SetForecastDays(days) => {
            let days = days.clamp(1, MAX_FORECAST_DAYS);
            let changed = state.forecast_days != days;
            state.forecast_days = days;
            changed
        }
        SettingsAction::Reset => replace(state, Settings::default()),
        SettingsAction::Replace(settings) => replace(state, settings),
    }
}

fn replace(state: &mut Settings, next: Settings) -> bool {
    if *state == next {
        return false;
    }
    *state = next;
    true
}

/// Persisted settings store, mirrored under [`SettingsStore::KEY`]
#[derive(Clone)]
pub struct SettingsStore {
    store: StoreWithMiddleware<Settings, SettingsAction, LoggingMiddleware>,
}

impl SettingsStore {
    pub const KEY: &'static str = "settings";

    /// Load settings from `storage`, falling back to [`Settings::default`]
    pub fn init(storage: SharedStorage) -> Self {
        Self::with_options(storage, PersistOptions::default())
    }

    pub fn with_options(storage: SharedStorage, options: PersistOptions) -> Self {
        let state =
            PersistentObservable::with_options(Self::KEY, Settings::default(), storage, options);
        Self {
            store: StoreWithMiddleware::new(state, reducer, LoggingMiddleware),
        }
    }

    /// Apply an action; returns whether the settings changed
    pub fn dispatch(&mut self, action: SettingsAction) -> bool {
        self.store.dispatch(action)
    }

    /// Apply an action, reporting a failed storage write
    pub fn try_dispatch(&mut self, action: SettingsAction) -> persist_dispatch::Result<bool> {
        self.store.try_dispatch(action)
    }

    pub fn get(&self) -> Settings {
        self.store.state()
    }

    /// Replace all settings at once, then persist and notify even if nothing changed
    pub fn set(&self, settings: Settings) {
        self.observable().set(settings);
    }

    pub fn subscribe(&self, callback: impl FnMut(&Settings) + 'static) -> Subscription {
        self.store.subscribe(callback)
    }

    pub fn dark_mode(&self) -> bool {
        self.store.with_state(|s| s.dark_mode)
    }

    pub fn unit(&self) -> TempUnit {
        self.store.with_state(|s| s.unit)
    }

    pub fn forecast_days(&self) -> u32 {
        self.store.with_state(|s| s.forecast_days)
    }

    /// The underlying persisted value
    pub fn observable(&self) -> &PersistentObservable<Settings> {
        self.store.store().observable()
    }
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SettingsStore")
            .field(self.observable())
            .finish()
    }
}
