//! Application-level error type.
//!
//! [`AppError`] unifies the engine and configuration errors for hosts.

use tessera_runtime::config::ConfigError;
use tessera_runtime::EngineError;
use tessera_types::ErrorCode;
use thiserror::Error;

/// Unified application error.
///
/// # Example
///
/// ```
/// use tessera_app::{AppError, EngineError};
///
/// let engine_err = EngineError::UnknownPage("Missing".into());
/// let app_err: AppError = engine_err.into();
///
/// eprintln!("Error: {}", app_err);
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Engine construction or request handling failed
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Host supplied a request the engine cannot accept
    #[error("Request error: {0}")]
    Request(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for AppError {
    fn code(&self) -> &'static str {
        match self {
            Self::Engine(e) => e.code(),
            Self::Config(_) => "APP_CONFIG_ERROR",
            Self::Request(_) => "APP_REQUEST_ERROR",
            Self::Io(_) => "APP_IO_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Engine(e) => e.is_recoverable(),
            Self::Config(_) | Self::Request(_) => false,
            Self::Io(_) => true,
        }
    }
}
