//! Default values for every configuration section.

use crate::schema::*;
use std::path::PathBuf;

/// Rows per list page when not configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            storage: StorageConfig::default(),
            bot: BotConfig::default(),
            moderation: ModerationConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: "https://api.telegram.org".to_string(),
            poll_timeout_seconds: 30,
            request_timeout_seconds: 40,
            rate_limit_per_second: 25,
            max_retries: 3,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/woxl.sled"),
            cache_capacity_bytes: 64 * 1024 * 1024,
            flush_every_ms: 1000,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "Woxl".to_string(),
            creator_ids: Vec::new(),
            locale: "ru".to_string(),
            timezone: "Europe/Moscow".to_string(),
        }
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            platform_admin_fallback: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            pretty: false,
            file_dir: None,
        }
    }
}
