//! Locale values as persisted in the locale cookie.
//!
//! The textual form is `lang`, `lang_COUNTRY` or `lang_COUNTRY_VARIANT`.
//! Anything with more terms is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::ErrorCode;

const TERM_SEPARATOR: char = '_';

/// Locale text that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    /// The name split into zero or more than three terms.
    #[error("locale '{name}' has {terms} terms, expected 1 to 3")]
    TermCount { name: String, terms: usize },
}

impl ErrorCode for LocaleError {
    fn code(&self) -> &'static str {
        match self {
            Self::TermCount { .. } => "LOCALE_TERM_COUNT",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// A language with optional country and variant.
///
/// # Example
///
/// ```
/// use tessera_types::Locale;
///
/// let locale = Locale::parse("en_US_POSIX").unwrap();
/// assert_eq!(locale.language(), "en");
/// assert_eq!(locale.country(), "US");
/// assert_eq!(locale.variant(), "POSIX");
/// assert_eq!(locale.to_string(), "en_US_POSIX");
///
/// assert!(Locale::parse("en_US_POSIX_X").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: String,
    country: String,
    variant: String,
}

impl Locale {
    /// Creates a locale from its parts; empty strings mean "absent".
    #[must_use]
    pub fn new(
        language: impl Into<String>,
        country: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into().to_lowercase(),
            country: country.into().to_uppercase(),
            variant: variant.into(),
        }
    }

    /// Language-only locale.
    #[must_use]
    pub fn language_only(language: impl Into<String>) -> Self {
        Self::new(language, "", "")
    }

    /// Parses `lang[_COUNTRY[_VARIANT]]`.
    ///
    /// # Errors
    ///
    /// Returns [`LocaleError::TermCount`] unless the name has 1 to 3 terms.
    pub fn parse(name: &str) -> Result<Self, LocaleError> {
        let terms: Vec<&str> = if name.is_empty() {
            Vec::new()
        } else {
            name.split(TERM_SEPARATOR).collect()
        };

        match terms.as_slice() {
            [language] => Ok(Self::new(*language, "", "")),
            [language, country] => Ok(Self::new(*language, *country, "")),
            [language, country, variant] => Ok(Self::new(*language, *country, *variant)),
            _ => Err(LocaleError::TermCount {
                name: name.to_string(),
                terms: terms.len(),
            }),
        }
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    #[must_use]
    pub fn variant(&self) -> &str {
        &self.variant
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if !self.country.is_empty() || !self.variant.is_empty() {
            write!(f, "{TERM_SEPARATOR}{}", self.country)?;
        }
        if !self.variant.is_empty() {
            write!(f, "{TERM_SEPARATOR}{}", self.variant)?;
        }
        Ok(())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_two_three_terms() {
        let en = Locale::parse("en").expect("language only");
        assert_eq!((en.language(), en.country(), en.variant()), ("en", "", ""));

        let en_us = Locale::parse("en_US").expect("language and country");
        assert_eq!(
            (en_us.language(), en_us.country(), en_us.variant()),
            ("en", "US", "")
        );

        let posix = Locale::parse("en_US_POSIX").expect("all three terms");
        assert_eq!(
            (posix.language(), posix.country(), posix.variant()),
            ("en", "US", "POSIX")
        );
    }

    #[test]
    fn display_round_trips() {
        for name in ["en", "en_US", "en_US_POSIX", "fr_CA"] {
            let locale = Locale::parse(name).expect("valid locale");
            assert_eq!(locale.to_string(), name);
            assert_eq!(Locale::parse(&locale.to_string()), Ok(locale));
        }
    }

    #[test]
    fn rejects_four_terms_and_empty() {
        assert_eq!(
            Locale::parse("en_US_POSIX_X"),
            Err(LocaleError::TermCount {
                name: "en_US_POSIX_X".into(),
                terms: 4
            })
        );
        assert!(Locale::parse("").is_err());
    }

    #[test]
    fn variant_without_country() {
        let locale = Locale::parse("de__1901").expect("empty country term");
        assert_eq!(locale.country(), "");
        assert_eq!(locale.variant(), "1901");
        assert_eq!(locale.to_string(), "de__1901");
    }

    #[test]
    fn normalizes_case() {
        let locale = Locale::new("EN", "us", "");
        assert_eq!(locale.to_string(), "en_US");
    }

    #[test]
    fn error_code() {
        let err = Locale::parse("a_b_c_d").expect_err("four terms");
        assert_eq!(err.code(), "LOCALE_TERM_COUNT");
        assert!(!err.is_recoverable());
    }
}
