//! Configuration management with hierarchical layering.
//!
//! # Architecture
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌───────────────────────────────────────────┐
//! │  1. Environment Variables (TESSERA_*)     │  Runtime override
//! ├───────────────────────────────────────────┤
//! │  2. Project Config (.tessera/config.toml) │  Project-specific
//! ├───────────────────────────────────────────┤
//! │  3. Global Config (~/.tessera/config.toml)│  User defaults
//! ├───────────────────────────────────────────┤
//! │  4. Default Values (compile-time)         │  Fallback
//! └───────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `TESSERA_DEBUG` | `debug` | bool |
//! | `TESSERA_HOME_PAGE` | `engine.home_page` | String |
//! | `TESSERA_SERVLET_PATH` | `engine.servlet_path` | String |
//! | `TESSERA_RESET_ENABLED` | `engine.reset_service_enabled` | bool |
//! | `TESSERA_DEFAULT_LOCALE` | `locale.default` | Locale |
//!
//! # Example Configuration
//!
//! ```toml
//! debug = false
//!
//! [engine]
//! servlet_path = "/app"
//! home_page = "Home"
//! reset_service_enabled = false
//! redirect_on_stale = false
//!
//! [pool]
//! max_idle_per_page = 8
//!
//! [locale]
//! default = "en"
//! cookie_name = "tessera-locale"
//!
//! [multipart]
//! max_size = 10000000
//! threshold_size = 1024
//! ```

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::{EngineConfig, LocaleConfig, MultipartConfig, PoolConfig, TesseraConfig};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".tessera")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".tessera";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
