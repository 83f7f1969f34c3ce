//! Markup writer errors.

use tessera_types::ErrorCode;
use thiserror::Error;

/// Misuse of a [`MarkupWrite`](crate::MarkupWrite) or a failing sink.
#[derive(Debug, Error)]
pub enum MarkupError {
    /// An attribute or tag close was requested with no start tag open.
    #[error("no start tag is open")]
    TagNotOpen,

    /// `end()` was called with an empty element stack.
    #[error("no element is open")]
    NoOpenElement,

    /// `end_element(name)` was called for an element not on the stack.
    #[error("element '{0}' is not open")]
    ElementNotOpen(String),

    /// The writer was already closed.
    #[error("markup writer is closed")]
    Closed,

    /// The underlying sink failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ErrorCode for MarkupError {
    fn code(&self) -> &'static str {
        match self {
            Self::TagNotOpen => "MARKUP_TAG_NOT_OPEN",
            Self::NoOpenElement => "MARKUP_NO_OPEN_ELEMENT",
            Self::ElementNotOpen(_) => "MARKUP_ELEMENT_NOT_OPEN",
            Self::Closed => "MARKUP_CLOSED",
            Self::Io(_) => "MARKUP_IO",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::assert_error_codes;

    #[test]
    fn all_codes_follow_convention() {
        assert_error_codes(
            &[
                MarkupError::TagNotOpen,
                MarkupError::NoOpenElement,
                MarkupError::ElementNotOpen("td".into()),
                MarkupError::Closed,
                MarkupError::Io(std::io::Error::other("disk full")),
            ],
            "MARKUP_",
        );
    }

    #[test]
    fn none_recoverable() {
        assert!(!MarkupError::TagNotOpen.is_recoverable());
        assert!(!MarkupError::Closed.is_recoverable());
    }
}
