//! Error types and utilities for quakewatch

use thiserror::Error;

/// Result type alias for quakewatch operations
pub type Result<T> = std::result::Result<T, QuakeError>;

/// Main error type for quakewatch operations
#[derive(Error, Debug)]
pub enum QuakeError {
    /// Transport-level failure reaching the feed (DNS, refused, timeout, HTTP status)
    #[error("Network error: {message}")]
    Network {
        /// What failed.
        message: String,
        /// HTTP status, when the server answered.
        status_code: Option<u16>,
        /// Transport error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed or unexpected response body
    #[error("Format error: {message}")]
    Format {
        /// What was wrong with the body.
        message: String,
        /// Parser error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// User input rejected by a format or range check
    #[error("Validation error: {message}")]
    Validation {
        /// Why the input was rejected.
        message: String,
        /// Name of the rejected input.
        field: Option<String>,
    },

    /// File system errors, e.g. while writing an export
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong with the configuration.
        message: String,
        /// Loader or validator error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl QuakeError {
    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
            status_code: None,
            source: None,
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            status_code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error carrying the HTTP status
    pub fn network_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Network {
            message: msg.into(),
            status_code: Some(status),
            source: None,
        }
    }

    /// Create a new format error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new format error with source
    pub fn format_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Format {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error for a specific field
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Short name of the error kind, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Format { .. } => "format",
            Self::Validation { .. } => "validation",
            Self::Io(_) => "io",
            Self::Config { .. } => "config",
        }
    }

    /// Whether the same operation may succeed when simply repeated later
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { status_code, .. } => match status_code {
                Some(code) => *code >= 500 || *code == 429,
                None => true,
            },
            // The feed may be mid-deploy; the next snapshot can parse again
            Self::Format { .. } => true,
            Self::Validation { .. } | Self::Io(_) | Self::Config { .. } => false,
        }
    }
}

impl From<serde_json::Error> for QuakeError {
    fn from(err: serde_json::Error) -> Self {
        Self::format_with_source("Response body is not a valid event batch", err)
    }
}
