//! Error types and utilities shared across the workspace.

use thiserror::Error;

/// Result type alias for Woxl operations
pub type Result<T> = std::result::Result<T, WoxlError>;

/// Main error type for Woxl operations
#[derive(Error, Debug)]
pub enum WoxlError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Telegram Bot API errors
    #[error("Telegram API error: {message}")]
    Telegram {
        /// Error description
        message: String,
        /// `error_code` reported by the API, if any
        error_code: Option<i64>,
    },

    /// Storage related errors
    #[error("Storage error: {message}")]
    Storage {
        /// Error description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl WoxlError {
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

    /// Create a new Telegram API error
    pub fn telegram(msg: impl Into<String>, error_code: Option<i64>) -> Self {
        Self::Telegram {
            message: msg.into(),
            error_code,
        }
    }

    /// Create a new storage error with source
    pub fn storage_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Telegram { error_code, .. } => {
                matches!(error_code, Some(code) if *code == 429 || *code >= 500)
            }
            _ => false,
        }
    }
}
