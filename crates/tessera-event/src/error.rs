//! Event layer errors.
//!
//! All event errors use the `EVENT_` prefix:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`EventError::NoTargets`] | `EVENT_NO_TARGETS` | No |
//! | [`EventError::NoEvents`] | `EVENT_NO_EVENTS` | No |
//! | [`EventError::InvalidTarget`] | `EVENT_INVALID_TARGET` | No |
//! | [`EventError::TriggerNotFound`] | `EVENT_TRIGGER_NOT_FOUND` | No |
//!
//! Every variant is a configuration mistake in the page, so none of them
//! is recoverable: the engine reports them through the exception page.

use serde::{Deserialize, Serialize};
use tessera_types::ErrorCode;
use thiserror::Error;

/// Event layer error.
///
/// ```
/// use tessera_event::EventError;
/// use tessera_types::ErrorCode;
///
/// let err = EventError::NoTargets { method: "onSave".into() };
/// assert_eq!(err.code(), "EVENT_NO_TARGETS");
/// assert!(err.to_string().contains("No targets found"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum EventError {
    /// A listener declaration names neither components nor elements.
    #[error("No targets found for listener method '{method}'")]
    NoTargets { method: String },

    /// A listener declaration names no events.
    #[error("no events declared for listener method '{method}'")]
    NoEvents { method: String },

    /// A target is not a usable component id.
    #[error("invalid listener target '{target}' on method '{method}'")]
    InvalidTarget { method: String, target: String },

    /// A rewind trigger addresses no component of the page.
    #[error("No targets found for trigger '{path}' (event '{event}') on page '{page}'")]
    TriggerNotFound {
        page: String,
        path: String,
        event: String,
    },
}

impl ErrorCode for EventError {
    fn code(&self) -> &'static str {
        match self {
            Self::NoTargets { .. } => "EVENT_NO_TARGETS",
            Self::NoEvents { .. } => "EVENT_NO_EVENTS",
            Self::InvalidTarget { .. } => "EVENT_INVALID_TARGET",
            Self::TriggerNotFound { .. } => "EVENT_TRIGGER_NOT_FOUND",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
