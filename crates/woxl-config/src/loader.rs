//! Configuration loading with environment variable overrides.

use crate::schema::Config;
use crate::validator::ConfigValidator;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use woxl_common::{UserId, WoxlError};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "WOXL_CONFIG_PATH";

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "woxl.toml";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Invalid configuration value for '{field}': {message}")]
    Validation {
        /// Dotted path of the offending field
        field: String,
        /// Reason
        message: String,
    },

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Variable name
        var: String,
        /// Parse failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for WoxlError {
    fn from(err: ConfigError) -> Self {
        Self::config_with_source("failed to load configuration", err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse_str(&content)?;

        Self::apply_env_overrides(&mut config)?;
        ConfigValidator::validate(&config)?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Resolve the configuration source and load it.
    ///
    /// Lookup order: `explicit`, then `WOXL_CONFIG_PATH`, then `woxl.toml` in
    /// the working directory, then built-in defaults. Environment overrides
    /// and validation apply in every case.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_config(path);
        }
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Self::load_config(path);
        }
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::load_config(DEFAULT_CONFIG_FILE);
        }

        debug!("No configuration file found, using defaults");
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Parse TOML text without overrides or validation.
    pub fn parse_str(content: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_from(config, |var| env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("BOT_TOKEN") {
            config.telegram.token = token;
        }

        if let Some(url) = lookup("TELEGRAM_API_URL") {
            config.telegram.api_url = url;
        }

        if let Some(timeout) = lookup("TELEGRAM_POLL_TIMEOUT") {
            config.telegram.poll_timeout_seconds =
                timeout.parse().map_err(|e| ConfigError::EnvParseError {
                    var: "TELEGRAM_POLL_TIMEOUT".to_string(),
                    source: Box::new(e),
                })?;
        }

        if let Some(path) = lookup("DATABASE_PATH") {
            config.storage.path = PathBuf::from(path);
        }

        if let Some(ids) = lookup("CREATOR_IDS") {
            config.bot.creator_ids = parse_creator_ids(&ids);
        }

        if let Some(locale) = lookup("WOXL_LOCALE") {
            config.bot.locale = locale;
        }

        if let Some(zone) = lookup("WOXL_TIMEZONE") {
            config.bot.timezone = zone;
        }

        if let Some(size) = lookup("WOXL_PAGE_SIZE") {
            config.moderation.page_size = size.parse().map_err(|e| ConfigError::EnvParseError {
                var: "WOXL_PAGE_SIZE".to_string(),
                source: Box::new(e),
            })?;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(json) = lookup("LOG_JSON") {
            config.logging.json = json.parse().map_err(|e| ConfigError::EnvParseError {
                var: "LOG_JSON".to_string(),
                source: Box::new(e),
            })?;
        }

        if let Some(dir) = lookup("LOG_DIR") {
            config.logging.file_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }
}

/// Parse a comma-separated id list, skipping entries that are not digits.
#[must_use]
pub fn parse_creator_ids(raw: &str) -> Vec<UserId> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|part| part.parse::<i64>().ok())
        .map(UserId)
        .collect()
}
