//! Weather dashboard CLI
//!
//! Inspect and change the dashboard's persisted favorites and settings.
//!
//! # Usage
//!
//! ```sh
//! weather-dashboard favorites add paris
//! weather-dashboard settings unit toggle
//! weather-dashboard --backend memory settings show
//! RUST_LOG=debug weather-dashboard storage dump
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use persist_dispatch::storage::Backend;
use tracing_subscriber::EnvFilter;

use weather_dashboard::{
    DashboardConfig, DashboardContext, FavoritesAction, Result, SettingsAction, TempUnit,
    MAX_FORECAST_DAYS,
};

/// Weather dashboard - persisted favorites and settings
#[derive(Parser, Debug)]
#[command(name = "weather-dashboard", version)]
#[command(about = "Manage the weather dashboard's saved favorites and settings")]
struct Args {
    /// Directory holding the storage file
    #[arg(long, global = true, env = "WEATHER_DASHBOARD_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Storage backend: file, memory or none (web only in browser builds)
    #[arg(long, global = true, env = "WEATHER_DASHBOARD_BACKEND", default_value = "file")]
    backend: Backend,

    /// Byte limit over all stored keys and values
    #[arg(long, global = true)]
    quota_bytes: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Favorite locations
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Display preferences
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Raw storage access
    #[command(subcommand)]
    Storage(StorageCommand),
}

#[derive(Subcommand, Debug)]
enum FavoritesCommand {
    /// Print every favorite, one per line
    List,
    /// Append a location id
    Add { id: String },
    /// Remove every entry for a location id
    Remove { id: String },
    /// Add the id if missing, remove it otherwise
    Toggle { id: String },
    /// Remove all favorites
    Clear,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Print current settings
    Show,
    /// Switch dark mode
    DarkMode {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Set the temperature unit
    Unit {
        #[arg(value_enum, ignore_case = true)]
        unit: UnitChoice,
    },
    /// Set how many days of forecast to show
    ForecastDays {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=MAX_FORECAST_DAYS as i64))]
        days: u32,
    },
    /// Restore default settings
    Reset,
}

#[derive(Subcommand, Debug)]
enum StorageCommand {
    /// Print every stored key and its raw value
    Dump,
    /// Delete everything the dashboard has stored
    Clear,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Switch {
    On,
    Off,
    Toggle,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum UnitChoice {
    #[value(name = "C")]
    Celsius,
    #[value(name = "F")]
    Fahrenheit,
    Toggle,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = DashboardConfig {
        backend: args.backend,
        storage_dir: args.storage_dir,
        quota_bytes: args.quota_bytes,
        ..DashboardConfig::default()
    };

    // Clearing must not load the stores: they write back on load and refuse a corrupt file
    if let Command::Storage(StorageCommand::Clear) = args.command {
        return DashboardContext::clear_storage(&config);
    }

    let mut ctx = DashboardContext::from_config(&config)?;
    match args.command {
        Command::Favorites(cmd) => run_favorites(&mut ctx, cmd),
        Command::Settings(cmd) => run_settings(&mut ctx, cmd),
        Command::Storage(StorageCommand::Dump) => {
            for (key, value) in ctx.dump()? {
                println!("{} = {}", key, value);
            }
            Ok(())
        }
        Command::Storage(StorageCommand::Clear) => Ok(()),
    }
}

fn run_favorites(ctx: &mut DashboardContext, cmd: FavoritesCommand) -> Result<()> {
    let action = match cmd {
        FavoritesCommand::List => {
            for id in ctx.favorites.get() {
                println!("{}", id);
            }
            return Ok(());
        }
        FavoritesCommand::Add { id } => FavoritesAction::Add(id),
        FavoritesCommand::Remove { id } => FavoritesAction::Remove(id),
        FavoritesCommand::Toggle { id } => FavoritesAction::Toggle(id),
        FavoritesCommand::Clear => FavoritesAction::Clear,
    };

    ctx.favorites.try_dispatch(action)?;
    Ok(())
}

fn run_settings(ctx: &mut DashboardContext, cmd: SettingsCommand) -> Result<()> {
    let action = match cmd {
        SettingsCommand::Show => {
            let settings = ctx.settings.get();
            println!("dark mode:     {}", if settings.dark_mode { "on" } else { "off" });
            println!("unit:          {}", settings.unit);
            println!("forecast days: {}", settings.forecast_days);
            return Ok(());
        }
        SettingsCommand::DarkMode { state } => match state {
            Switch::On => SettingsAction::SetDarkMode(true),
            Switch::Off => SettingsAction::SetDarkMode(false),
            Switch::Toggle => SettingsAction::ToggleDarkMode,
        },
        SettingsCommand::Unit { unit } => match unit {
            UnitChoice::Celsius => SettingsAction::SetUnit(TempUnit::Celsius),
            UnitChoice::Fahrenheit => SettingsAction::SetUnit(TempUnit::Fahrenheit),
            UnitChoice::Toggle => SettingsAction::ToggleUnit,
        },
        SettingsCommand::ForecastDays { days } => SettingsAction::SetForecastDays(days),
        SettingsCommand::Reset => SettingsAction::Reset,
    };

    ctx.settings.try_dispatch(action)?;
    Ok(())
}
