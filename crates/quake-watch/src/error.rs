//! Application-wide error types using thiserror.

use quake_common::QuakeError;
use quake_config::ConfigError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    /// Feed, filter or export error.
    #[error(transparent)]
    Feed(#[from] QuakeError),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(String),

    /// Terminal I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The refresh task ended abnormally.
    #[error("Refresh task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for the watch application.
pub type WatchResult<T> = Result<T, WatchError>;
