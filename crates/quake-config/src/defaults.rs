//! Default values mirroring the public USGS query the tool was built around.

use crate::schema::*;
use chrono::NaiveDate;
use quake_common::LogFormat;

/// USGS FDSN event query endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

/// Seconds between refresh ticks.
pub const DEFAULT_REFRESH_SECONDS: u64 = 10;

/// Default export file name.
pub const DEFAULT_EXPORT_PATH: &str = "output_earthquake.csv";

/// First day of the default query window.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 11, 22).unwrap_or_default()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            refresh: RefreshConfig::default(),
            export: ExportConfig::default(),
            display: DisplayConfig::default(),
            logging: LogSettings::default(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            start_date: default_start_date(),
            end_date: None,
            updated_after_time: "14:00:00".to_string(),
            timeout_seconds: 30,
            user_agent: concat!("quakewatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_REFRESH_SECONDS,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_EXPORT_PATH.to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_rows: 25,
            chart_width: 40,
            column_width: 40,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            file: None,
        }
    }
}
