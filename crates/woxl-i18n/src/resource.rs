//! Embedded Fluent resources

use crate::error::{I18nError, I18nResult};
use crate::Locale;
use fluent_bundle::FluentResource;
use tracing::error;

/// Raw `.ftl` source bundled for a locale.
pub fn embedded_source(locale: Locale) -> &'static str {
    match locale {
        Locale::Russian => include_str!("../locales/ru/main.ftl"),
        Locale::English => include_str!("../locales/en/main.ftl"),
    }
}

/// Parse the bundled resource of a locale.
pub fn load_resource(locale: Locale) -> I18nResult<FluentResource> {
    FluentResource::try_new(embedded_source(locale).to_string()).map_err(|(_, errors)| {
        let errors: Vec<String> = errors.iter().map(|e| format!("{e:?}")).collect();
        error!(locale = locale.code(), ?errors, "Failed to parse Fluent resource");
        I18nError::FluentParseError {
            locale: locale.code().to_string(),
            errors,
        }
    })
}
