//! Configuration schema definitions using serde.

use chrono::NaiveDate;
use quake_common::{LogFormat, LoggingConfig};
use serde::{Deserialize, Serialize};

/// Main configuration structure for quakewatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event feed configuration.
    pub feed: FeedConfig,
    /// Refresh loop configuration.
    pub refresh: RefreshConfig,
    /// CSV export configuration.
    pub export: ExportConfig,
    /// Terminal display configuration.
    pub display: DisplayConfig,
    /// Logging configuration.
    pub logging: LogSettings,
}

/// Event feed query configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Query endpoint without parameters.
    pub endpoint: String,
    /// First day of the query window. Also the baseline user date filters must exceed.
    pub start_date: NaiveDate,
    /// Last day of the query window; open-ended (today) when absent.
    pub end_date: Option<NaiveDate>,
    /// Time of day appended to `start_date` for the `updatedafter` parameter, `HH:MM:SS`.
    pub updated_after_time: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// User agent sent with each request.
    pub user_agent: String,
}

/// Refresh loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between refresh ticks.
    pub interval_seconds: u64,
}

/// CSV export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default output path used when `export` is given no path.
    pub path: String,
}

/// Terminal display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Maximum table rows printed per refresh.
    pub max_rows: usize,
    /// Width in characters of the longest chart bar.
    pub chart_width: usize,
    /// Maximum characters printed for place and title columns.
    pub column_width: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter directive, e.g. `info` or `quake_feed=debug`.
    pub level: String,
    /// Line format.
    pub format: LogFormat,
    /// Optional log file; stderr when absent.
    pub file: Option<String>,
}

impl LogSettings {
    /// Converts into the logging bootstrap configuration.
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            format: self.format,
            file_path: self.file.clone(),
            ..LoggingConfig::default()
        }
    }
}
