//! Runtime validation of a loaded configuration.

use crate::loader::ConfigError;
use crate::schema::Config;
use chrono::NaiveTime;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, collecting every problem found.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let problems = Self::problems(config);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    /// Lists all problems in `config`; empty when valid.
    pub fn problems(config: &Config) -> Vec<String> {
        let mut problems = Vec::new();

        match Url::parse(&config.feed.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => problems.push(format!(
                "feed.endpoint must use http or https, got '{}'",
                url.scheme()
            )),
            Err(e) => problems.push(format!("feed.endpoint is not a valid URL: {e}")),
        }

        if let Some(end) = config.feed.end_date {
            if end < config.feed.start_date {
                problems.push(format!(
                    "feed.end_date {end} is before feed.start_date {}",
                    config.feed.start_date
                ));
            }
        }

        if NaiveTime::parse_from_str(&config.feed.updated_after_time, "%H:%M:%S").is_err() {
            problems.push(format!(
                "feed.updated_after_time '{}' must be HH:MM:SS",
                config.feed.updated_after_time
            ));
        }

        if !(1..=300).contains(&config.feed.timeout_seconds) {
            problems.push("feed.timeout_seconds must be between 1 and 300".to_string());
        }

        if config.refresh.interval_seconds == 0 {
            problems.push("refresh.interval_seconds must be at least 1".to_string());
        }

        if config.export.path.trim().is_empty() {
            problems.push("export.path cannot be empty".to_string());
        }

        if config.display.max_rows == 0 {
            problems.push("display.max_rows must be greater than 0".to_string());
        }

        if config.display.chart_width == 0 {
            problems.push("display.chart_width must be greater than 0".to_string());
        }

        if config.display.column_width < 4 {
            problems.push("display.column_width must be at least 4".to_string());
        }

        if EnvFilter::try_new(&config.logging.level).is_err() {
            problems.push(format!(
                "logging.level '{}' is not a valid filter directive",
                config.logging.level
            ));
        }

        problems
    }
}
