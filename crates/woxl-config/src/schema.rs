//! Configuration schema definitions.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use woxl_common::{logging::LoggingConfig, parse_timezone, UserId};

/// Main configuration structure for the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telegram Bot API configuration.
    pub telegram: TelegramConfig,
    /// Persistent storage configuration.
    pub storage: StorageConfig,
    /// Bot identity and locale.
    pub bot: BotConfig,
    /// Moderation behaviour.
    pub moderation: ModerationConfig,
    /// Logging output.
    pub logging: LoggingSettings,
}

/// Telegram Bot API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather.
    pub token: String,
    /// Base URL of the Bot API server.
    pub api_url: String,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_seconds: u64,
    /// HTTP request timeout. Must exceed the poll timeout.
    pub request_timeout_seconds: u64,
    /// Outbound request budget per second.
    pub rate_limit_per_second: u32,
    /// Retries for transient API failures.
    pub max_retries: usize,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of the sled database.
    pub path: PathBuf,
    /// Page cache size in bytes.
    pub cache_capacity_bytes: u64,
    /// Background flush interval.
    pub flush_every_ms: u64,
}

/// Bot identity, creators and presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Name used in greetings.
    pub name: String,
    /// Users allowed to run creator-only commands.
    pub creator_ids: Vec<UserId>,
    /// Locale code of replies (`ru` or `en`).
    pub locale: String,
    /// IANA zone used for displayed times and the new-year countdown.
    pub timezone: String,
}

/// Moderation behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Rows per list page.
    pub page_size: usize,
    /// Count platform `creator`/`administrator` status as roles 5/4 for
    /// callers without a stored role.
    pub platform_admin_fallback: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `woxl_commands=debug,info`.
    pub level: String,
    /// Emit JSON lines.
    pub json: bool,
    /// Multi-line console output.
    pub pretty: bool,
    /// Directory for daily-rolling log files.
    pub file_dir: Option<PathBuf>,
}

impl Config {
    /// Zone for displayed times, Moscow if the configured name is invalid.
    #[must_use]
    pub fn zone(&self) -> Tz {
        parse_timezone(&self.bot.timezone).unwrap_or(chrono_tz::Europe::Moscow)
    }
}

impl BotConfig {
    /// Whether the user may run creator-only commands.
    #[must_use]
    pub fn is_creator(&self, user: UserId) -> bool {
        self.creator_ids.contains(&user)
    }
}

impl LoggingSettings {
    /// Converts to the logging bootstrap configuration.
    #[must_use]
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            json_format: self.json,
            pretty_format: self.pretty,
            file_dir: self.file_dir.clone(),
            ..LoggingConfig::default()
        }
    }
}
