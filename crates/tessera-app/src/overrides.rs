//! Host configuration overrides.
//!
//! Applied as the highest priority layer after file/env config loading.

use tessera_runtime::config::TesseraConfig;

/// Overrides supplied by a host, typically from command-line flags.
///
/// # Example
///
/// ```
/// use tessera_app::CliOverrides;
/// use tessera_runtime::config::TesseraConfig;
///
/// let mut config = TesseraConfig::default();
/// CliOverrides::new().debug(true).reset_enabled(true).apply(&mut config);
///
/// assert!(config.debug);
/// assert!(config.engine.reset_service_enabled);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    debug: Option<bool>,
    reset_enabled: Option<bool>,
    redirect_on_stale: Option<bool>,
    servlet_path: Option<String>,
    home_page: Option<String>,
}

impl CliOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn debug(mut self, value: bool) -> Self {
        self.debug = Some(value);
        self
    }

    #[must_use]
    pub fn reset_enabled(mut self, value: bool) -> Self {
        self.reset_enabled = Some(value);
        self
    }

    #[must_use]
    pub fn redirect_on_stale(mut self, value: bool) -> Self {
        self.redirect_on_stale = Some(value);
        self
    }

    /// Sets the servlet path override if Some.
    #[must_use]
    pub fn servlet_path_opt(mut self, path: Option<String>) -> Self {
        if let Some(p) = path {
            self.servlet_path = Some(p);
        }
        self
    }

    /// Sets the home page override if Some.
    #[must_use]
    pub fn home_page_opt(mut self, page: Option<String>) -> Self {
        if let Some(p) = page {
            self.home_page = Some(p);
        }
        self
    }

    pub fn apply(&self, config: &mut TesseraConfig) {
        if let Some(d) = self.debug {
            config.debug = d;
        }
        if let Some(r) = self.reset_enabled {
            config.engine.reset_service_enabled = r;
        }
        if let Some(r) = self.redirect_on_stale {
            config.engine.redirect_on_stale = r;
        }
        if let Some(ref p) = self.servlet_path {
            config.engine.servlet_path.clone_from(p);
        }
        if let Some(ref p) = self.home_page {
            config.engine.home_page.clone_from(p);
        }
    }
}
