//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.tessera/config.toml`)
//! 3. Project config (`.tessera/config.toml`)
//! 4. Environment variables (`TESSERA_*`)
//!
//! Each layer overrides the previous.

use super::{default_config_path, ConfigError, TesseraConfig, PROJECT_CONFIG_DIR, PROJECT_CONFIG_FILE};
use std::path::{Path, PathBuf};
use tessera_types::Locale;
use tracing::debug;

/// Helper macro for parsing boolean environment variables.
macro_rules! parse_env_bool {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected bool"))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```no_run
/// use tessera_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_project_root("/path/to/project")
///     .skip_env_vars()
///     .load()?;
/// # Ok::<(), tessera_runtime::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to ~/.tessera/config.toml).
    global_config_path: Option<PathBuf>,

    project_root: Option<PathBuf>,

    skip_env: bool,

    skip_global: bool,

    skip_project: bool,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Project config will be loaded from `<project_root>/.tessera/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    ///
    /// Useful for testing with deterministic config.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    #[must_use]
    pub fn skip_project_config(mut self) -> Self {
        self.skip_project = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any config file exists but cannot be parsed.
    /// Missing config files are silently ignored.
    pub fn load(&self) -> Result<TesseraConfig, ConfigError> {
        let mut config = TesseraConfig::default();

        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global_config) = self.load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.merge(&global_config);
            }
        }

        if !self.skip_project {
            if let Some(ref project_root) = self.project_root {
                let project_config_path = project_root
                    .join(PROJECT_CONFIG_DIR)
                    .join(PROJECT_CONFIG_FILE);

                if let Some(project_config) = self.load_file(&project_config_path)? {
                    debug!(
                        path = %project_config_path.display(),
                        project = %project_root.display(),
                        "Loaded project config"
                    );
                    config.merge(&project_config);
                }
            }
        }

        if !self.skip_env {
            self.apply_env_vars(&mut config)?;
        }

        Ok(config)
    }

    /// Loads a config file, returning None if it doesn't exist.
    fn load_file(&self, path: &Path) -> Result<Option<TesseraConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

        let config =
            TesseraConfig::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

        Ok(Some(config))
    }

    fn apply_env_vars(&self, config: &mut TesseraConfig) -> Result<(), ConfigError> {
        parse_env_bool!(config.debug, "TESSERA_DEBUG");
        parse_env_bool!(config.engine.reset_service_enabled, "TESSERA_RESET_ENABLED");

        if let Ok(val) = std::env::var("TESSERA_HOME_PAGE") {
            config.engine.home_page = val;
        }
        if let Ok(val) = std::env::var("TESSERA_SERVLET_PATH") {
            config.engine.servlet_path = val;
        }
        if let Ok(val) = std::env::var("TESSERA_DEFAULT_LOCALE") {
            config.locale.default = Locale::parse(&val)
                .map_err(|e| ConfigError::invalid_env_var("TESSERA_DEFAULT_LOCALE", e.to_string()))?;
        }

        Ok(())
    }
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off" (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
