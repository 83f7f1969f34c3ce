//! Engine errors.
//!
//! Every failure a request can hit is an [`EngineError`]. The engine sorts
//! them by [`ErrorKind`] to decide how the request ends:
//!
//! | Kind | Response |
//! |------|----------|
//! | `StaleSession` | the `StaleSession` page, or a redirect to it |
//! | `StaleLink` | the `StaleLink` page |
//! | `Configuration` / `Validation` | reported, then the `Exception` page with status 500 |
//! | `Io` | returned to the host |
//!
//! # Error Codes
//!
//! | Variant | Code | Kind |
//! |---------|------|------|
//! | [`UnknownService`](EngineError::UnknownService) | `ENGINE_UNKNOWN_SERVICE` | Configuration |
//! | [`DuplicateService`](EngineError::DuplicateService) | `ENGINE_DUPLICATE_SERVICE` | Configuration |
//! | [`ContextArity`](EngineError::ContextArity) | `ENGINE_CONTEXT_ARITY` | Configuration |
//! | [`UnexpectedParameters`](EngineError::UnexpectedParameters) | `ENGINE_UNEXPECTED_PARAMETERS` | Configuration |
//! | [`UnknownPage`](EngineError::UnknownPage) | `ENGINE_UNKNOWN_PAGE` | Configuration |
//! | [`UnknownAlias`](EngineError::UnknownAlias) | `ENGINE_UNKNOWN_ALIAS` | Configuration |
//! | [`AliasRedefined`](EngineError::AliasRedefined) | `ENGINE_ALIAS_REDEFINED` | Configuration |
//! | [`InvalidComponent`](EngineError::InvalidComponent) | `ENGINE_INVALID_COMPONENT` | Configuration |
//! | [`NotExternal`](EngineError::NotExternal) | `ENGINE_NOT_EXTERNAL` | Configuration |
//! | [`InvalidPhase`](EngineError::InvalidPhase) | `ENGINE_INVALID_PHASE` | Configuration |
//! | [`PayloadTooLarge`](EngineError::PayloadTooLarge) | `ENGINE_PAYLOAD_TOO_LARGE` | Configuration |
//! | [`InvalidParameter`](EngineError::InvalidParameter) | `ENGINE_INVALID_PARAMETER` | Validation |
//! | [`StaleLink`](EngineError::StaleLink) | `ENGINE_STALE_LINK` | StaleLink |
//! | [`StaleSession`](EngineError::StaleSession) | `ENGINE_STALE_SESSION` | StaleSession |
//! | [`Upload`](EngineError::Upload) | `ENGINE_UPLOAD` | Io |
//! | [`Io`](EngineError::Io) | `ENGINE_IO` | Io |
//! | [`Link`](EngineError::Link) | `ENGINE_LINK` | Configuration |
//! | [`Locale`](EngineError::Locale) | `ENGINE_LOCALE` | Configuration |
//! | [`Markup`](EngineError::Markup) | `ENGINE_MARKUP` | Io for sink failures, else Configuration |
//! | [`Component`](EngineError::Component) | `ENGINE_COMPONENT` | StaleLink for a missing component, Io for sink failures, else Configuration |
//!
//! Stale errors are the only recoverable ones: the user can simply start
//! over from a fresh page.

use std::path::PathBuf;
use tessera_component::ComponentError;
use tessera_markup::MarkupError;
use tessera_types::{ErrorCode, LinkError, LocaleError};
use thiserror::Error;

use crate::CyclePhase;

/// How a request ends when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    StaleSession,
    StaleLink,
    Io,
    Validation,
}

/// Engine layer error.
///
/// # Example
///
/// ```
/// use tessera_runtime::{EngineError, ErrorKind};
/// use tessera_types::ErrorCode;
///
/// let err = EngineError::ContextArity {
///     service: "direct".into(),
///     expected: "3 or 4",
///     actual: 2,
/// };
/// assert_eq!(err.code(), "ENGINE_CONTEXT_ARITY");
/// assert_eq!(err.kind(), ErrorKind::Configuration);
/// assert!(!err.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no service named '{0}'")]
    UnknownService(String),

    #[error("service '{0}' is registered twice")]
    DuplicateService(String),

    /// A service URL carried the wrong number of context slots.
    #[error("service '{service}' expects {expected} context values, got {actual}")]
    ContextArity {
        service: String,
        expected: &'static str,
        actual: usize,
    },

    /// The service takes no parameters.
    #[error("service '{0}' does not accept parameters")]
    UnexpectedParameters(String),

    #[error("no page named '{0}'")]
    UnknownPage(String),

    #[error("no component alias '{0}'")]
    UnknownAlias(String),

    /// Applications may add aliases but not replace the built-in ones.
    #[error("component alias '{0}' is built in and cannot be redefined")]
    AliasRedefined(String),

    /// Component configuration did not match the alias.
    #[error("invalid configuration for '{alias}' component '{id}': {message}")]
    InvalidComponent {
        alias: String,
        id: String,
        message: String,
    },

    #[error("page '{0}' cannot be activated by the external service")]
    NotExternal(String),

    #[error("request cycle cannot move from {from:?} to {to:?}")]
    InvalidPhase { from: CyclePhase, to: CyclePhase },

    #[error("request of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("invalid request parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// The link addresses a component the page does not have.
    #[error("stale link: page '{page}' has no component '{path}'")]
    StaleLink { page: String, path: String },

    /// The target needs the session the link was rendered in, which is gone.
    #[error("stale session: '{target}' requires an established session")]
    StaleSession { target: String },

    #[error("upload '{path}': {message}")]
    Upload { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Locale(#[from] LocaleError),

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Component(#[from] ComponentError),
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StaleLink { .. } => ErrorKind::StaleLink,
            Self::StaleSession { .. } => ErrorKind::StaleSession,
            Self::InvalidParameter { .. } => ErrorKind::Validation,
            Self::Io(_) | Self::Upload { .. } => ErrorKind::Io,
            Self::Markup(MarkupError::Io(_)) => ErrorKind::Io,
            Self::Component(ComponentError::NotFound { .. }) => ErrorKind::StaleLink,
            Self::Component(ComponentError::Markup(MarkupError::Io(_))) => ErrorKind::Io,
            _ => ErrorKind::Configuration,
        }
    }

    pub(crate) fn arity(service: &str, expected: &'static str, actual: usize) -> Self {
        Self::ContextArity {
            service: service.to_string(),
            expected,
            actual,
        }
    }
}

impl ErrorCode for EngineError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownService(_) => "ENGINE_UNKNOWN_SERVICE",
            Self::DuplicateService(_) => "ENGINE_DUPLICATE_SERVICE",
            Self::ContextArity { .. } => "ENGINE_CONTEXT_ARITY",
            Self::UnexpectedParameters(_) => "ENGINE_UNEXPECTED_PARAMETERS",
            Self::UnknownPage(_) => "ENGINE_UNKNOWN_PAGE",
            Self::UnknownAlias(_) => "ENGINE_UNKNOWN_ALIAS",
            Self::AliasRedefined(_) => "ENGINE_ALIAS_REDEFINED",
            Self::InvalidComponent { .. } => "ENGINE_INVALID_COMPONENT",
            Self::NotExternal(_) => "ENGINE_NOT_EXTERNAL",
            Self::InvalidPhase { .. } => "ENGINE_INVALID_PHASE",
            Self::PayloadTooLarge { .. } => "ENGINE_PAYLOAD_TOO_LARGE",
            Self::InvalidParameter { .. } => "ENGINE_INVALID_PARAMETER",
            Self::StaleLink { .. } => "ENGINE_STALE_LINK",
            Self::StaleSession { .. } => "ENGINE_STALE_SESSION",
            Self::Upload { .. } => "ENGINE_UPLOAD",
            Self::Io(_) => "ENGINE_IO",
            Self::Link(_) => "ENGINE_LINK",
            Self::Locale(_) => "ENGINE_LOCALE",
            Self::Markup(_) => "ENGINE_MARKUP",
            Self::Component(_) => "ENGINE_COMPONENT",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::StaleLink | ErrorKind::StaleSession)
    }
}
