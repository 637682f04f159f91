//! Runtime validation of a loaded configuration.

use crate::loader::ConfigError;
use crate::schema::Config;
use woxl_common::parse_timezone;

/// Locale codes with bundled translations.
pub const SUPPORTED_LOCALES: [&str; 2] = ["ru", "en"];

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting the first offending field.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let telegram = &config.telegram;
        if telegram.token.trim().is_empty() {
            return Err(invalid("telegram.token", "bot token is required (set BOT_TOKEN)"));
        }
        if !telegram.api_url.starts_with("http://") && !telegram.api_url.starts_with("https://") {
            return Err(invalid("telegram.api_url", "must be an http(s) URL"));
        }
        if telegram.request_timeout_seconds <= telegram.poll_timeout_seconds {
            return Err(invalid(
                "telegram.request_timeout_seconds",
                "must be greater than poll_timeout_seconds",
            ));
        }
        if telegram.rate_limit_per_second == 0 {
            return Err(invalid("telegram.rate_limit_per_second", "must be positive"));
        }
        if config.moderation.page_size == 0 {
            return Err(invalid("moderation.page_size", "must be positive"));
        }
        if !SUPPORTED_LOCALES.contains(&config.bot.locale.as_str()) {
            return Err(invalid("bot.locale", "unsupported locale"));
        }
        if parse_timezone(&config.bot.timezone).is_none() {
            return Err(invalid("bot.timezone", "unknown IANA time zone"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
