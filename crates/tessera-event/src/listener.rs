//! Listener bindings for one component or element.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A page method bound to an event.
///
/// When `form_id` is set the listener is a *form event* listener: the
/// named form is submitted (and optionally validated) before the method
/// runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBoundListener {
    method: String,
    form_id: Option<String>,
    validate_form: bool,
}

impl EventBoundListener {
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            form_id: None,
            validate_form: false,
        }
    }

    #[must_use]
    pub fn with_form(
        method: impl Into<String>,
        form_id: impl Into<String>,
        validate_form: bool,
    ) -> Self {
        Self {
            method: method.into(),
            form_id: Some(form_id.into()),
            validate_form,
        }
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn form_id(&self) -> Option<&str> {
        self.form_id.as_deref()
    }

    #[must_use]
    pub fn is_validate_form(&self) -> bool {
        self.validate_form
    }
}

/// Every listener bound to one target, grouped by event name.
///
/// Plain listeners and form listeners are kept apart; both keep the order
/// in which they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEventProperty {
    id: String,
    events: BTreeMap<String, Vec<EventBoundListener>>,
    form_events: BTreeMap<String, Vec<EventBoundListener>>,
}

impl ComponentEventProperty {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// The component id or element id this property describes.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Binds `listener` to `event`, in the form map if it names a form.
    pub fn add_listener(&mut self, event: &str, listener: EventBoundListener) {
        let map = if listener.form_id.is_some() {
            &mut self.form_events
        } else {
            &mut self.events
        };
        map.entry(event.to_string()).or_default().push(listener);
    }

    #[must_use]
    pub fn event_listeners(&self, event: &str) -> &[EventBoundListener] {
        self.events.get(event).map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn form_event_listeners(&self, event: &str) -> &[EventBoundListener] {
        self.form_events.get(event).map_or(&[][..], Vec::as_slice)
    }

    /// Plain listeners then form listeners for `event`.
    pub fn all_listeners<'a>(
        &'a self,
        event: &str,
    ) -> impl Iterator<Item = &'a EventBoundListener> + 'a {
        self.event_listeners(event)
            .iter()
            .chain(self.form_event_listeners(event).iter())
    }

    /// Event names with at least one listener, sorted.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        let mut names: Vec<&str> = self
            .events
            .keys()
            .chain(self.form_events.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names.into_iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.form_events.is_empty()
    }
}
