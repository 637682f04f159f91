//! Error types for internationalization operations

use thiserror::Error;

/// Errors that can occur during internationalization operations
#[derive(Error, Debug)]
pub enum I18nError {
    /// Failed to parse a language identifier
    #[error("Invalid language identifier: {0}")]
    InvalidLanguageId(String),

    /// Failed to parse a Fluent resource
    #[error("Failed to parse Fluent resource for {locale}: {errors:?}")]
    FluentParseError {
        /// Locale whose resource failed
        locale: String,
        /// Parser diagnostics
        errors: Vec<String>,
    },

    /// Message not found in any bundle
    #[error("Message not found: {key}")]
    MessageNotFound {
        /// Requested message id
        key: String,
    },

    /// Failed to format a message
    #[error("Failed to format message '{key}': {errors:?}")]
    MessageFormatError {
        /// Requested message id
        key: String,
        /// Resolver diagnostics
        errors: Vec<String>,
    },

    /// Adding a resource to a bundle failed
    #[error("Failed to create bundle for locale {locale}: {errors:?}")]
    BundleCreationError {
        /// Locale whose bundle failed
        locale: String,
        /// Bundle diagnostics
        errors: Vec<String>,
    },
}

/// Result type for i18n operations
pub type I18nResult<T> = Result<T, I18nError>;
