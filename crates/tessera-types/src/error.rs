//! Unified error interface for Tessera.
//!
//! Every error enum in the workspace implements [`ErrorCode`] so that the
//! engine, the exception page and the host can treat failures uniformly.
//!
//! # Design
//!
//! - **Machine-readable codes**: the exception page and logs show them
//! - **Recoverability**: separates "send the user to a stale page" from
//!   "the application is misconfigured"
//!
//! # Example
//!
//! ```
//! use tessera_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum LookupError {
//!     UnknownPage(String),
//!     SessionExpired,
//! }
//!
//! impl ErrorCode for LookupError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::UnknownPage(_) => "LOOKUP_UNKNOWN_PAGE",
//!             Self::SessionExpired => "LOOKUP_SESSION_EXPIRED",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::SessionExpired)
//!     }
//! }
//!
//! let err = LookupError::SessionExpired;
//! assert_eq!(err.code(), "LOOKUP_SESSION_EXPIRED");
//! assert!(err.is_recoverable());
//! ```

/// Unified error code interface for Tessera errors.
///
/// # Code Format
///
/// - **UPPER_SNAKE_CASE**: e.g. `"MARKUP_TAG_NOT_OPEN"`
/// - **Prefixed by layer**: `MARKUP_`, `EVENT_`, `COMPONENT_`, `ENGINE_`, ...
/// - **Stable**: codes are shown on the exception page and must not drift
///
/// # Recoverability
///
/// An error is recoverable when the request can be answered with a
/// meaningful page instead of the exception page:
///
/// - a stale session or stale link (re-render a dedicated page)
/// - a field validation failure (re-render the form with errors)
///
/// Configuration errors (bad context arity, unknown alias, unknown
/// service) are never recoverable.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;

    /// Returns whether the error is recoverable.
    ///
    /// - `true`: the engine can answer with a dedicated page
    /// - `false`: the failure is reported through the exception page
    fn is_recoverable(&self) -> bool;
}

/// Validates that an error code follows workspace conventions.
///
/// # Checks
///
/// 1. Code is not empty
/// 2. Code starts with the expected prefix
/// 3. Code is UPPER_SNAKE_CASE
///
/// # Panics
///
/// Panics with a descriptive message if validation fails.
///
/// # Example
///
/// ```
/// use tessera_types::{ErrorCode, assert_error_code};
///
/// #[derive(Debug)]
/// enum PoolError { Exhausted }
///
/// impl ErrorCode for PoolError {
///     fn code(&self) -> &'static str { "POOL_EXHAUSTED" }
///     fn is_recoverable(&self) -> bool { true }
/// }
///
/// assert_error_code(&PoolError::Exhausted, "POOL_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");

    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );

    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Validates every variant of an error enum at once.
///
/// ```
/// use tessera_types::{ErrorCode, assert_error_codes};
///
/// #[derive(Debug)]
/// enum RenderError { Io, Closed }
///
/// impl ErrorCode for RenderError {
///     fn code(&self) -> &'static str {
///         match self {
///             Self::Io => "RENDER_IO",
///             Self::Closed => "RENDER_CLOSED",
///         }
///     }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_codes(&[RenderError::Io, RenderError::Closed], "RENDER_");
/// ```
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
