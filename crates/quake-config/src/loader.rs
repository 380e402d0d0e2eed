//! Configuration loading utilities

use crate::schema::Config;
use crate::validator::ConfigValidator;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_VAR: &str = "QUAKEWATCH_CONFIG_PATH";

/// File names probed in the working directory, in order.
pub const DEFAULT_CONFIG_FILES: [&str; 3] =
    ["quakewatch.toml", "quakewatch.yaml", "quakewatch.yml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File extension is neither TOML nor YAML
    #[error("Unsupported configuration format: '{0}' (expected .toml, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {message}")]
    EnvParse {
        /// Variable name.
        var: String,
        /// What was wrong with the value.
        message: String,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl From<ConfigError> for quake_common::QuakeError {
    fn from(err: ConfigError) -> Self {
        quake_common::QuakeError::config_with_source("Could not load configuration", err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML or YAML file with environment variable overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let mut config = Self::parse_file(path.as_ref())?;
        Self::apply_env_overrides(&mut config)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from the usual places.
    ///
    /// Order: `QUAKEWATCH_CONFIG_PATH`, then the default file names in the
    /// working directory, then built-in defaults. Environment overrides are
    /// applied last in every case.
    pub fn load() -> Result<Config, ConfigError> {
        if let Ok(path) = env::var(CONFIG_PATH_VAR) {
            return Self::load_from_file(path);
        }

        if let Some(path) = DEFAULT_CONFIG_FILES
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
        {
            return Self::load_from_file(path);
        }

        debug!("No configuration file found, using defaults");
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise as [`ConfigLoader::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }

    /// Parse a file without applying overrides or validation
    pub fn parse_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let config = match extension.as_deref() {
            Some("toml") => Self::parse_toml(&content)?,
            Some("yaml" | "yml") => Self::parse_yaml(&content)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Parse TOML text
    pub fn parse_toml(content: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse YAML text
    pub fn parse_yaml(content: &str) -> Result<Config, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_from(config, |name| env::var(name).ok())
    }

    /// Apply overrides read through `lookup`, which maps a variable name to its value
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("QUAKEWATCH_ENDPOINT") {
            config.feed.endpoint = endpoint;
        }

        if let Some(start) = lookup("QUAKEWATCH_START_DATE") {
            config.feed.start_date = parse_env("QUAKEWATCH_START_DATE", &start)?;
        }

        if let Some(end) = lookup("QUAKEWATCH_END_DATE") {
            config.feed.end_date = if end.trim().is_empty() {
                None
            } else {
                Some(parse_env("QUAKEWATCH_END_DATE", &end)?)
            };
        }

        if let Some(timeout) = lookup("QUAKEWATCH_TIMEOUT") {
            config.feed.timeout_seconds = parse_env("QUAKEWATCH_TIMEOUT", &timeout)?;
        }

        if let Some(interval) = lookup("QUAKEWATCH_REFRESH_SECONDS") {
            config.refresh.interval_seconds = parse_env("QUAKEWATCH_REFRESH_SECONDS", &interval)?;
        }

        if let Some(path) = lookup("QUAKEWATCH_EXPORT_PATH") {
            config.export.path = path;
        }

        if let Some(level) = lookup("QUAKEWATCH_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}

fn parse_env<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::EnvParse {
        var: var.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in<'a>(
        vars: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| vars.get(name).map(|v| (*v).to_string())
    }

    #[test]
    fn test_overrides_applied() {
        let vars = HashMap::from([
            ("QUAKEWATCH_ENDPOINT", "http://localhost:9000/query"),
            ("QUAKEWATCH_START_DATE", "2024-01-15"),
            ("QUAKEWATCH_REFRESH_SECONDS", "30"),
            ("QUAKEWATCH_LOG_LEVEL", "debug"),
        ]);
        let mut config = Config::default();
        ConfigLoader::apply_overrides_from(&mut config, lookup_in(&vars)).unwrap();

        assert_eq!(config.feed.endpoint, "http://localhost:9000/query");
        assert_eq!(config.feed.start_date.to_string(), "2024-01-15");
        assert_eq!(config.refresh.interval_seconds, 30);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.feed.timeout_seconds, 30);
    }

    #[test]
    fn test_bad_override_names_variable() {
        let vars = HashMap::from([("QUAKEWATCH_TIMEOUT", "soon")]);
        let mut config = Config::default();
        let err = ConfigLoader::apply_overrides_from(&mut config, lookup_in(&vars)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EnvParse { ref var, .. } if var == "QUAKEWATCH_TIMEOUT"
        ));
    }

    #[test]
    fn test_empty_end_date_clears_it() {
        let vars = HashMap::from([("QUAKEWATCH_END_DATE", "")]);
        let mut config = Config::default();
        config.feed.end_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1);
        ConfigLoader::apply_overrides_from(&mut config, lookup_in(&vars)).unwrap();
        assert!(config.feed.end_date.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ConfigLoader::parse_toml(
            r#"
[refresh]
interval_seconds = 5
"#,
        )
        .unwrap();
        assert_eq!(config.refresh.interval_seconds, 5);
        assert_eq!(config.feed, crate::FeedConfig::default());
    }
}
