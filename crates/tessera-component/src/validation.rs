//! Per-request collection of field validation errors.
//!
//! Form fields record problems while the page is rewound; when the page is
//! rendered again the same fields look their errors up and decorate
//! themselves. Nothing here aborts the request.

use serde::{Deserialize, Serialize};
use tessera_markup::{MarkupError, MarkupWrite};

/// CSS class applied to fields and labels in error.
pub const ERROR_CLASS: &str = "tessera-error";

/// One field's validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Id path of the field, as submitted.
    pub field: String,
    pub message: String,
    /// The rejected input, re-displayed instead of the property value.
    pub value: Option<String>,
}

/// Tracks validation errors for the current request.
///
/// ```
/// use tessera_component::ValidationDelegate;
///
/// let mut delegate = ValidationDelegate::new();
/// delegate.record("form.email", "is required", Some(String::new()));
/// assert!(delegate.has_errors());
/// assert!(delegate.is_in_error("form.email"));
/// assert_eq!(delegate.field_error("form.email").unwrap().message, "is required");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationDelegate {
    errors: Vec<FieldError>,
}

impl ValidationDelegate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error; a later error for the same field replaces it.
    pub fn record(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        value: Option<String>,
    ) {
        let field = field.into();
        tracing::debug!(field = %field, "validation error recorded");
        self.errors.retain(|err| err.field != field);
        self.errors.push(FieldError {
            field,
            message: message.into(),
            value,
        });
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    #[must_use]
    pub fn field_error(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|err| err.field == field)
    }

    #[must_use]
    pub fn is_in_error(&self, field: &str) -> bool {
        self.field_error(field).is_some()
    }

    pub fn clear_field(&mut self, field: &str) {
        self.errors.retain(|err| err.field != field);
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Writes the error message after a field, if it has one.
    ///
    /// # Errors
    ///
    /// Propagates writer failures.
    pub fn write_field_suffix(
        &self,
        writer: &mut dyn MarkupWrite,
        field: &str,
    ) -> Result<(), MarkupError> {
        let Some(err) = self.field_error(field) else {
            return Ok(());
        };
        writer.begin("span")?;
        writer.attribute("class", ERROR_CLASS)?;
        writer.print(&err.message)?;
        writer.end()
    }
}
