//! Component layer errors.
//!
//! All component errors use the `COMPONENT_` prefix:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`DuplicateId`](ComponentError::DuplicateId) | `COMPONENT_DUPLICATE_ID` | No |
//! | [`InvalidId`](ComponentError::InvalidId) | `COMPONENT_INVALID_ID` | No |
//! | [`NotFound`](ComponentError::NotFound) | `COMPONENT_NOT_FOUND` | Yes |
//! | [`MissingCapability`](ComponentError::MissingCapability) | `COMPONENT_MISSING_CAPABILITY` | No |
//! | [`UnknownListener`](ComponentError::UnknownListener) | `COMPONENT_UNKNOWN_LISTENER` | No |
//! | [`ListenerFailed`](ComponentError::ListenerFailed) | `COMPONENT_LISTENER_FAILED` | No |
//! | [`NestedLink`](ComponentError::NestedLink) | `COMPONENT_NESTED_LINK` | No |
//! | [`Busy`](ComponentError::Busy) | `COMPONENT_BUSY` | No |
//! | [`LinkFailed`](ComponentError::LinkFailed) | `COMPONENT_LINK_FAILED` | No |
//! | [`PageUnavailable`](ComponentError::PageUnavailable) | `COMPONENT_PAGE_UNAVAILABLE` | No |
//! | [`Markup`](ComponentError::Markup) | `COMPONENT_MARKUP` | No |
//! | [`Event`](ComponentError::Event) | `COMPONENT_EVENT` | No |
//!
//! `NotFound` is the only recoverable variant: a link that addresses a
//! component the page no longer has is stale, not broken.
//!
//! # Example
//!
//! ```
//! use tessera_component::ComponentError;
//! use tessera_types::ErrorCode;
//!
//! let err = ComponentError::NotFound {
//!     page: "Home".into(),
//!     path: "form.gone".into(),
//! };
//! assert_eq!(err.code(), "COMPONENT_NOT_FOUND");
//! assert!(err.is_recoverable());
//! ```

use tessera_event::EventError;
use tessera_markup::MarkupError;
use tessera_types::ErrorCode;
use thiserror::Error;

/// Component layer error.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// Two siblings share a local id.
    #[error("component id '{id}' already used under '{parent}' on page '{page}'")]
    DuplicateId {
        page: String,
        parent: String,
        id: String,
    },

    /// A local id is empty or contains the separator or whitespace.
    #[error("invalid component id '{0}'")]
    InvalidId(String),

    /// No component lives at the path.
    #[error("page '{page}' has no component '{path}'")]
    NotFound { page: String, path: String },

    /// The component lacks a capability the operation requires.
    #[error("component '{path}' is not {capability}")]
    MissingCapability {
        path: String,
        capability: &'static str,
    },

    /// A listener method is not registered on the page.
    #[error("page '{page}' has no listener method '{method}'")]
    UnknownListener { page: String, method: String },

    /// A listener reported a failure.
    #[error("listener '{method}' failed: {message}")]
    ListenerFailed { method: String, message: String },

    /// A link component was rendered inside another link component.
    #[error("link component '{path}' may not be nested inside another link")]
    NestedLink { path: String },

    /// The component is already being rendered or rewound.
    #[error("component '{0}' is busy")]
    Busy(String),

    /// A link could not be built.
    #[error("cannot build '{service}' link: {message}")]
    LinkFailed { service: String, message: String },

    /// Another page could not be obtained for rendering one of its blocks.
    #[error("page '{page}' is unavailable: {message}")]
    PageUnavailable { page: String, message: String },

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Event(#[from] EventError),
}

impl ComponentError {
    /// Shorthand for listener bodies.
    ///
    /// ```
    /// use tessera_component::ComponentError;
    ///
    /// let err = ComponentError::listener("onSave", "database offline");
    /// assert!(err.to_string().contains("onSave"));
    /// ```
    #[must_use]
    pub fn listener(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ListenerFailed {
            method: method.into(),
            message: message.into(),
        }
    }
}

impl ErrorCode for ComponentError {
    fn code(&self) -> &'static str {
        match self {
            Self::DuplicateId { .. } => "COMPONENT_DUPLICATE_ID",
            Self::InvalidId(_) => "COMPONENT_INVALID_ID",
            Self::NotFound { .. } => "COMPONENT_NOT_FOUND",
            Self::MissingCapability { .. } => "COMPONENT_MISSING_CAPABILITY",
            Self::UnknownListener { .. } => "COMPONENT_UNKNOWN_LISTENER",
            Self::ListenerFailed { .. } => "COMPONENT_LISTENER_FAILED",
            Self::NestedLink { .. } => "COMPONENT_NESTED_LINK",
            Self::Busy(_) => "COMPONENT_BUSY",
            Self::LinkFailed { .. } => "COMPONENT_LINK_FAILED",
            Self::PageUnavailable { .. } => "COMPONENT_PAGE_UNAVAILABLE",
            Self::Markup(_) => "COMPONENT_MARKUP",
            Self::Event(_) => "COMPONENT_EVENT",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::assert_error_codes;

    fn all_variants() -> Vec<ComponentError> {
        vec![
            ComponentError::DuplicateId {
                page: "P".into(),
                parent: "".into(),
                id: "a".into(),
            },
            ComponentError::InvalidId("a b".into()),
            ComponentError::NotFound {
                page: "P".into(),
                path: "x".into(),
            },
            ComponentError::MissingCapability {
                path: "x".into(),
                capability: "Direct",
            },
            ComponentError::UnknownListener {
                page: "P".into(),
                method: "m".into(),
            },
            ComponentError::listener("m", "boom"),
            ComponentError::NestedLink { path: "x".into() },
            ComponentError::Busy("x".into()),
            ComponentError::LinkFailed {
                service: "direct".into(),
                message: "unknown".into(),
            },
            ComponentError::PageUnavailable {
                page: "Library".into(),
                message: "busy".into(),
            },
            ComponentError::Markup(MarkupError::TagNotOpen),
            ComponentError::Event(EventError::NoTargets { method: "m".into() }),
        ]
    }

    #[test]
    fn codes_follow_convention() {
        assert_error_codes(&all_variants(), "COMPONENT_");
    }

    #[test]
    fn only_not_found_is_recoverable() {
        let recoverable: Vec<&str> = all_variants()
            .iter()
            .filter(|err| err.is_recoverable())
            .map(|err| err.code())
            .collect();
        assert_eq!(recoverable, vec!["COMPONENT_NOT_FOUND"]);
    }

    #[test]
    fn wrapped_errors_keep_message() {
        let err: ComponentError = EventError::NoTargets { method: "m".into() }.into();
        assert!(err.to_string().contains("No targets found"));
    }
}
