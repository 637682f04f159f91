//! Supported locales

use crate::error::{I18nError, I18nResult};
use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

/// Supported locales
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Locale {
    /// Russian, the default reply language.
    #[default]
    Russian,
    /// English.
    English,
}

impl Locale {
    /// Full language tag
    pub fn code(&self) -> &'static str {
        match self {
            Self::Russian => "ru-RU",
            Self::English => "en-US",
        }
    }

    /// Short language code, also the resource directory name
    pub fn short_code(&self) -> &'static str {
        match self {
            Self::Russian => "ru",
            Self::English => "en",
        }
    }

    /// Parse a locale from a language code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ru" | "ru-RU" => Some(Self::Russian),
            "en" | "en-US" | "en-GB" => Some(Self::English),
            _ => None,
        }
    }

    /// Convert to a Fluent language identifier
    pub fn to_language_identifier(&self) -> I18nResult<LanguageIdentifier> {
        self.code()
            .parse()
            .map_err(|_| I18nError::InvalidLanguageId(self.code().to_string()))
    }

    /// All supported locales
    pub fn all() -> [Self; 2] {
        [Self::Russian, Self::English]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for locale in Locale::all() {
            assert_eq!(Locale::from_code(locale.short_code()), Some(locale));
            assert_eq!(Locale::from_code(locale.code()), Some(locale));
            assert!(locale.to_language_identifier().is_ok());
        }
        assert_eq!(Locale::from_code("de"), None);
        assert_eq!(Locale::default(), Locale::Russian);
    }
}
