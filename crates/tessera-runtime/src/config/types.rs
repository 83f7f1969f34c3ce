//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tessera_types::Locale;

/// Main configuration structure.
///
/// # Example
///
/// ```
/// use tessera_runtime::config::TesseraConfig;
///
/// let config = TesseraConfig::default();
/// assert!(!config.debug);
/// assert_eq!(config.engine.servlet_path, "/app");
/// assert!(!config.engine.reset_service_enabled);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TesseraConfig {
    /// Debug mode: exception pages include the cause chain.
    pub debug: bool,

    pub engine: EngineConfig,

    pub pool: PoolConfig,

    pub locale: LocaleConfig,

    pub multipart: MultipartConfig,
}

impl TesseraConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another config into this one.
    ///
    /// Values from `other` override values in `self` only if they
    /// differ from the default. This enables layered configuration.
    pub fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.debug != default.debug {
            self.debug = other.debug;
        }

        self.engine.merge(&other.engine);
        self.pool.merge(&other.pool);
        self.locale.merge(&other.locale);
        self.multipart.merge(&other.multipart);
    }
}

/// Request-cycle engine settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Path prefix every service URL starts with.
    pub servlet_path: String,

    /// Page rendered by the home service.
    pub home_page: String,

    /// Whether the reset service discards pooled pages.
    ///
    /// Anyone can request a reset URL, so this stays off in production.
    pub reset_service_enabled: bool,

    /// Answer stale sessions with a redirect instead of rendering the
    /// `StaleSession` page in place.
    pub redirect_on_stale: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            servlet_path: "/app".into(),
            home_page: "Home".into(),
            reset_service_enabled: false,
            redirect_on_stale: false,
        }
    }
}

impl EngineConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.servlet_path != default.servlet_path {
            self.servlet_path = other.servlet_path.clone();
        }
        if other.home_page != default.home_page {
            self.home_page = other.home_page.clone();
        }
        if other.reset_service_enabled != default.reset_service_enabled {
            self.reset_service_enabled = other.reset_service_enabled;
        }
        if other.redirect_on_stale != default.redirect_on_stale {
            self.redirect_on_stale = other.redirect_on_stale;
        }
    }
}

/// Page pool settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PoolConfig {
    /// Idle instances kept per page name; extra instances are dropped.
    pub max_idle_per_page: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_page: 8,
        }
    }
}

impl PoolConfig {
    fn merge(&mut self, other: &Self) {
        if other.max_idle_per_page != Self::default().max_idle_per_page {
            self.max_idle_per_page = other.max_idle_per_page;
        }
    }
}

/// Locale negotiation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LocaleConfig {
    /// Locale used when neither cookie nor request names one.
    pub default: Locale,

    /// Cookie persisting the user's locale.
    pub cookie_name: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default: Locale::language_only("en"),
            cookie_name: "tessera-locale".into(),
        }
    }
}

impl LocaleConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.default != default.default {
            self.default = other.default.clone();
        }
        if other.cookie_name != default.cookie_name {
            self.cookie_name = other.cookie_name.clone();
        }
    }
}

/// Multipart request settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MultipartConfig {
    /// Largest accepted request body in bytes.
    pub max_size: u64,

    /// Uploads above this many bytes are stored on disk.
    pub threshold_size: u64,

    /// Directory for stored uploads; the system temp dir when unset.
    pub repository: Option<PathBuf>,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_size: 10_000_000,
            threshold_size: 1024,
            repository: None,
        }
    }
}

impl MultipartConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.max_size != default.max_size {
            self.max_size = other.max_size;
        }
        if other.threshold_size != default.threshold_size {
            self.threshold_size = other.threshold_size;
        }
        if other.repository.is_some() {
            self.repository = other.repository.clone();
        }
    }

    /// Directory uploads are spilled to.
    #[must_use]
    pub fn repository_dir(&self) -> PathBuf {
        self.repository.clone().unwrap_or_else(std::env::temp_dir)
    }
}
