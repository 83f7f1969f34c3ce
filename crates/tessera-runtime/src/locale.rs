//! Request locale negotiation and persistence.
//!
//! | Source | Used when |
//! |--------|-----------|
//! | locale cookie | present |
//! | request preference | no cookie |
//! | configured default | neither |

use tessera_types::Locale;
use tracing::debug;

use crate::config::LocaleConfig;
use crate::request::{Cookie, WebRequest};
use crate::EngineError;

/// Cookie lifetime: one year.
pub const LOCALE_COOKIE_MAX_AGE: u64 = 365 * 24 * 60 * 60;

/// Reads and writes the locale cookie.
#[derive(Debug, Clone)]
pub struct RequestLocaleManager {
    cookie_name: String,
    default: Locale,
    cookie_path: String,
}

impl RequestLocaleManager {
    #[must_use]
    pub fn new(config: &LocaleConfig, cookie_path: impl Into<String>) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            default: config.default.clone(),
            cookie_path: cookie_path.into(),
        }
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Locale of the request.
    ///
    /// # Errors
    ///
    /// [`EngineError::Locale`] when the cookie holds an unparsable locale.
    pub fn extract(&self, request: &WebRequest) -> Result<Locale, EngineError> {
        if let Some(value) = request.cookie(&self.cookie_name) {
            let locale = Locale::parse(value)?;
            debug!(locale = %locale, "locale from cookie");
            return Ok(locale);
        }
        Ok(request
            .preferred_locale()
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }

    /// Cookie recording `locale`, or `None` when it matches what the
    /// request already had.
    #[must_use]
    pub fn persist(&self, locale: &Locale, request_locale: &Locale) -> Option<Cookie> {
        if locale == request_locale {
            return None;
        }
        debug!(locale = %locale, "persisting locale");
        Some(
            Cookie::new(&self.cookie_name, locale.to_string())
                .with_path(&self.cookie_path)
                .with_max_age(LOCALE_COOKIE_MAX_AGE),
        )
    }
}
