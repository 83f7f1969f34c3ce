//! Programmatic listener declarations.
//!
//! A declaration says "run page method `M` when event `E` happens on these
//! components or elements", optionally submitting a form first. It is the
//! builder-style equivalent of an annotated listener method:
//!
//! ```text
//! ListenerDeclaration::new("onEmailClick")
//!     .target("email")           ─┐
//!     .element("foo")             ├─ connect(&mut invoker)
//!     .event("onClick")          ─┘
//!
//! invoker.component_events("email") → onClick → [onEmailClick]
//! invoker.element_events("foo")     → onClick → [onEmailClick]
//! ```

use serde::{Deserialize, Serialize};
use tessera_types::IdPath;

use crate::error::EventError;
use crate::invoker::ComponentEventInvoker;
use crate::listener::EventBoundListener;

/// Declares a listener method and what it listens to.
///
/// # Example
///
/// ```
/// use tessera_event::{ComponentEventInvoker, ListenerDeclaration};
///
/// let mut invoker = ComponentEventInvoker::new();
/// ListenerDeclaration::new("formListener")
///     .target("email")
///     .event("onClick")
///     .submit_form("testForm")
///     .connect(&mut invoker)
///     .unwrap();
///
/// let listeners = invoker
///     .component_events("email")
///     .unwrap()
///     .form_event_listeners("onClick");
/// assert_eq!(listeners[0].form_id(), Some("testForm"));
/// assert!(!listeners[0].is_validate_form());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerDeclaration {
    method: String,
    targets: Vec<String>,
    elements: Vec<String>,
    events: Vec<String>,
    submit_form: Option<String>,
    validate_form: bool,
}

impl ListenerDeclaration {
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    /// Adds a component target (local id or id path).
    #[must_use]
    pub fn target(mut self, component_id: impl Into<String>) -> Self {
        self.targets.push(component_id.into());
        self
    }

    /// Adds a client-side element target.
    #[must_use]
    pub fn element(mut self, element_id: impl Into<String>) -> Self {
        self.elements.push(element_id.into());
        self
    }

    #[must_use]
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.events.push(event.into());
        self
    }

    /// Submits the named form before the listener runs.
    #[must_use]
    pub fn submit_form(mut self, form_id: impl Into<String>) -> Self {
        self.submit_form = Some(form_id.into());
        self
    }

    /// Skips the listener while the submitted form has validation errors.
    #[must_use]
    pub fn validate_form(mut self, validate: bool) -> Self {
        self.validate_form = validate;
        self
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    #[must_use]
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    #[must_use]
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// The form submitted before the listener, if any.
    #[must_use]
    pub fn form(&self) -> Option<&str> {
        self.submit_form.as_deref()
    }

    /// Registers the declaration with `invoker`.
    ///
    /// # Errors
    ///
    /// - [`EventError::NoTargets`] with neither targets nor elements
    /// - [`EventError::NoEvents`] with no events
    /// - [`EventError::InvalidTarget`] for a malformed component target
    pub fn connect(&self, invoker: &mut ComponentEventInvoker) -> Result<(), EventError> {
        if self.targets.is_empty() && self.elements.is_empty() {
            return Err(EventError::NoTargets {
                method: self.method.clone(),
            });
        }
        if self.events.is_empty() {
            return Err(EventError::NoEvents {
                method: self.method.clone(),
            });
        }
        for target in &self.targets {
            if target.is_empty() || IdPath::parse(target).is_err() {
                return Err(EventError::InvalidTarget {
                    method: self.method.clone(),
                    target: target.clone(),
                });
            }
        }

        for event in &self.events {
            for target in &self.targets {
                invoker.add_event_listener(target, event, self.listener());
            }
            for element in &self.elements {
                invoker.add_element_event_listener(element, event, self.listener());
            }
        }
        tracing::debug!(
            method = %self.method,
            targets = self.targets.len(),
            elements = self.elements.len(),
            "listener connected"
        );
        Ok(())
    }

    fn listener(&self) -> EventBoundListener {
        match &self.submit_form {
            Some(form) => EventBoundListener::with_form(&self.method, form, self.validate_form),
            None => EventBoundListener::new(&self.method),
        }
    }
}
