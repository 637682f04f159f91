//! Internationalization manager

use crate::bundle::BundleManager;
use crate::error::{I18nError, I18nResult};
use crate::resource::load_resource;
use crate::Locale;
use fluent::FluentArgs;
use tracing::{info, warn};

/// Formats localized replies with fallback to the default locale
#[derive(Debug)]
pub struct I18nManager {
    default_locale: Locale,
    bundle_manager: BundleManager,
}

impl I18nManager {
    /// Create a manager with every bundled locale loaded
    pub fn new(default_locale: Locale) -> I18nResult<Self> {
        let mut bundle_manager = BundleManager::new();
        for locale in Locale::all() {
            bundle_manager.add_resource(locale, load_resource(locale)?)?;
        }

        info!(locale = default_locale.code(), "I18nManager initialized");
        Ok(Self {
            default_locale,
            bundle_manager,
        })
    }

    /// Get a localized message
    pub fn get_message(
        &self,
        key: &str,
        locale: &Locale,
        args: Option<&FluentArgs>,
    ) -> I18nResult<String> {
        if self.bundle_manager.has_message(*locale, key) {
            return self.bundle_manager.format_message(*locale, key, args);
        }

        if *locale != self.default_locale
            && self.bundle_manager.has_message(self.default_locale, key)
        {
            warn!(
                key,
                locale = locale.code(),
                "Message missing, falling back to default locale"
            );
            return self
                .bundle_manager
                .format_message(self.default_locale, key, args);
        }

        Err(I18nError::MessageNotFound {
            key: key.to_string(),
        })
    }

    /// Get a localized message with fallback to a default text
    pub fn get_message_or_default(
        &self,
        key: &str,
        locale: &Locale,
        args: Option<&FluentArgs>,
        default: &str,
    ) -> String {
        self.get_message(key, locale, args).unwrap_or_else(|e| {
            warn!(key, error = %e, "Using default text");
            default.to_string()
        })
    }

    /// Format a message in the default locale, falling back to the key itself
    pub fn t(&self, key: &str, args: Option<&FluentArgs>) -> String {
        self.get_message_or_default(key, &self.default_locale, args, key)
    }

    /// Check if a message exists for the given locale
    pub fn has_message(&self, key: &str, locale: &Locale) -> bool {
        self.bundle_manager.has_message(*locale, key)
            || (*locale != self.default_locale
                && self.bundle_manager.has_message(self.default_locale, key))
    }

    /// The locale replies are rendered in
    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }
}
