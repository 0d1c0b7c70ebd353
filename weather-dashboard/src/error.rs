//! Error types for the weather dashboard

use persist_dispatch::StorageError;
use thiserror::Error;

/// Errors surfaced by dashboard operations
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Reading or writing persisted state failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Invalid command-line or environment configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
