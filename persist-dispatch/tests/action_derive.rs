//! Tests for #[derive(Action)] macro

use persist_dispatch::{Action, ActionSummary};

#[derive(Action, Clone, Debug, PartialEq)]
enum Plain {
    Refresh,
    Select(usize),
    Move { from: usize, to: usize },
}

#[test]
fn test_variant_names() {
    assert_eq!(Plain::Refresh.name(), "Refresh");
    assert_eq!(Plain::Select(3).name(), "Select");
    assert_eq!(Plain::Move { from: 0, to: 1 }.name(), "Move");
}

#[test]
fn test_namespace_prefix() {
    #[derive(Action, Clone, Debug)]
    #[action(namespace = "favorites")]
    enum FavoritesAction {
        Add(String),
        Clear,
    }

    assert_eq!(FavoritesAction::Add("paris".into()).name(), "favorites.Add");
    assert_eq!(FavoritesAction::Clear.name(), "favorites.Clear");
}

#[test]
fn test_variant_rename() {
    #[derive(Action, Clone, Debug)]
    #[action(namespace = "settings")]
    enum SettingsAction {
        #[action(rename = "Unit")]
        SetUnit(char),
        Reset,
    }

    assert_eq!(SettingsAction::SetUnit('F').name(), "settings.Unit");
    assert_eq!(SettingsAction::Reset.name(), "settings.Reset");
}

#[test]
fn test_rename_without_namespace() {
    #[derive(Action, Clone, Debug)]
    enum Renamed {
        #[action(rename = "go")]
        Navigate,
    }

    assert_eq!(Renamed::Navigate.name(), "go");
}

#[test]
fn test_default_summary_uses_debug() {
    impl ActionSummary for Plain {}

    assert_eq!(Plain::Select(2).summary(), "Select(2)");
}

#[test]
fn test_generic_enum() {
    #[derive(Action, Clone, Debug)]
    enum Replace<T: Clone + std::fmt::Debug + 'static> {
        With(T),
        Nothing,
    }

    assert_eq!(Replace::With(5u8).name(), "With");
    assert_eq!(Replace::<u8>::Nothing.name(), "Nothing");
}
