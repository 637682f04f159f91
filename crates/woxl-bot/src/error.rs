//! Application-wide error types using thiserror.

use woxl_common::WoxlError;
use woxl_config::ConfigError;
use woxl_i18n::I18nError;
use woxl_moderation::PlatformError;
use woxl_storage::StorageError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Shared infrastructure failure (logging, I/O).
    #[error(transparent)]
    Common(#[from] WoxlError),

    /// The database could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Reply texts could not be loaded.
    #[error("Localization error: {0}")]
    I18n(#[from] I18nError),

    /// A Bot API call failed.
    #[error("Telegram error: {0}")]
    Telegram(#[from] PlatformError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid client settings.
    #[error("Client setup error: {0}")]
    Setup(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;
