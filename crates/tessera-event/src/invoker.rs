//! Page-wide registry of event listeners.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tessera_types::IdPath;

use crate::error::EventError;
use crate::listener::{ComponentEventProperty, EventBoundListener};

/// The component and event that caused a rewind.
///
/// ```
/// use tessera_event::Trigger;
/// use tessera_types::IdPath;
///
/// let trigger = Trigger::new(IdPath::parse("form.email").unwrap(), "onClick");
/// assert_eq!(trigger.event(), "onClick");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trigger {
    id_path: IdPath,
    event: String,
}

impl Trigger {
    /// Event name used when a direct link or form submission triggers a
    /// component without naming an event.
    pub const DEFAULT_EVENT: &'static str = "trigger";

    /// Submission parameter naming the component that raised the event.
    pub const PATH_PARAMETER: &'static str = "_trigger";

    /// Submission parameter naming the event.
    pub const EVENT_PARAMETER: &'static str = "_event";

    #[must_use]
    pub fn new(id_path: IdPath, event: impl Into<String>) -> Self {
        Self {
            id_path,
            event: event.into(),
        }
    }

    /// Trigger with [`DEFAULT_EVENT`](Self::DEFAULT_EVENT).
    #[must_use]
    pub fn component(id_path: IdPath) -> Self {
        Self::new(id_path, Self::DEFAULT_EVENT)
    }

    /// Trigger carried by a submitted form.
    ///
    /// `path` and `event` are the values of [`PATH_PARAMETER`](Self::PATH_PARAMETER)
    /// and [`EVENT_PARAMETER`](Self::EVENT_PARAMETER). An absent or empty
    /// path means the form itself, an absent or empty event the default
    /// event.
    ///
    /// ```
    /// use tessera_event::Trigger;
    /// use tessera_types::IdPath;
    ///
    /// let form = IdPath::parse("form").unwrap();
    /// let trigger = Trigger::from_submission(&form, "Home", Some("form.email"), Some("onClick")).unwrap();
    /// assert_eq!(trigger.id_path().as_str(), "form.email");
    ///
    /// let plain = Trigger::from_submission(&form, "Home", None, None).unwrap();
    /// assert_eq!(plain, Trigger::component(form));
    /// ```
    ///
    /// # Errors
    ///
    /// [`EventError::TriggerNotFound`] for a path that does not parse.
    pub fn from_submission(
        form: &IdPath,
        page: &str,
        path: Option<&str>,
        event: Option<&str>,
    ) -> Result<Self, EventError> {
        let event = event
            .filter(|event| !event.is_empty())
            .unwrap_or(Self::DEFAULT_EVENT);
        let id_path = match path.filter(|path| !path.is_empty()) {
            None => form.clone(),
            Some(raw) => IdPath::parse(raw).map_err(|_| EventError::TriggerNotFound {
                page: page.to_string(),
                path: raw.to_string(),
                event: event.to_string(),
            })?,
        };
        Ok(Self::new(id_path, event))
    }

    #[must_use]
    pub fn id_path(&self) -> &IdPath {
        &self.id_path
    }

    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }
}

/// Listeners of one page, keyed by component id and by element id.
///
/// Component keys are either a full id path (`form.email`) or a local id
/// (`email`); [`listeners_for`](Self::listeners_for) consults both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentEventInvoker {
    component_events: HashMap<String, ComponentEventProperty>,
    element_events: HashMap<String, ComponentEventProperty>,
}

impl ComponentEventInvoker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event_listener(
        &mut self,
        component_id: &str,
        event: &str,
        listener: EventBoundListener,
    ) {
        tracing::trace!(component_id, event, method = listener.method(), "bind component listener");
        self.component_events
            .entry(component_id.to_string())
            .or_insert_with(|| ComponentEventProperty::new(component_id))
            .add_listener(event, listener);
    }

    pub fn add_element_event_listener(
        &mut self,
        element_id: &str,
        event: &str,
        listener: EventBoundListener,
    ) {
        tracing::trace!(element_id, event, method = listener.method(), "bind element listener");
        self.element_events
            .entry(element_id.to_string())
            .or_insert_with(|| ComponentEventProperty::new(element_id))
            .add_listener(event, listener);
    }

    #[must_use]
    pub fn component_events(&self, component_id: &str) -> Option<&ComponentEventProperty> {
        self.component_events.get(component_id)
    }

    #[must_use]
    pub fn element_events(&self, element_id: &str) -> Option<&ComponentEventProperty> {
        self.element_events.get(element_id)
    }

    /// Listeners bound to the component at `id_path` for `event`.
    ///
    /// Listeners keyed by the full path come first, then those keyed by
    /// the local id. A local-id key is not scoped to a container: `email`
    /// matches `form.email`, `other.email` and every other component on
    /// the page whose last segment is `email`. Use a full path key to
    /// bind a single component.
    #[must_use]
    pub fn listeners_for(&self, id_path: &IdPath, event: &str) -> Vec<&EventBoundListener> {
        let mut found: Vec<&EventBoundListener> = self
            .component_events(id_path.as_str())
            .map(|property| property.all_listeners(event).collect())
            .unwrap_or_default();

        if let Some(leaf) = id_path.leaf().filter(|leaf| *leaf != id_path.as_str()) {
            if let Some(property) = self.component_events(leaf) {
                found.extend(property.all_listeners(event));
            }
        }
        found
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.component_events.is_empty() && self.element_events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> IdPath {
        IdPath::parse(text).expect("valid id path")
    }

    #[test]
    fn component_and_element_registries_are_separate() {
        let mut invoker = ComponentEventInvoker::new();
        invoker.add_event_listener("email", "onClick", EventBoundListener::new("a"));
        invoker.add_element_event_listener("foo", "onClick", EventBoundListener::new("b"));

        assert_eq!(
            invoker
                .component_events("email")
                .map(|p| p.event_listeners("onClick").len()),
            Some(1)
        );
        assert!(invoker.component_events("foo").is_none());
        assert!(invoker.element_events("email").is_none());
        assert_eq!(
            invoker
                .element_events("foo")
                .map(|p| p.event_listeners("onClick").len()),
            Some(1)
        );
    }

    #[test]
    fn listeners_for_matches_path_and_leaf() {
        let mut invoker = ComponentEventInvoker::new();
        invoker.add_event_listener("form.email", "onClick", EventBoundListener::new("by_path"));
        invoker.add_event_listener("email", "onClick", EventBoundListener::new("by_id"));
        invoker.add_event_listener("email", "onBlur", EventBoundListener::new("other_event"));

        let methods: Vec<&str> = invoker
            .listeners_for(&path("form.email"), "onClick")
            .into_iter()
            .map(EventBoundListener::method)
            .collect();
        assert_eq!(methods, vec!["by_path", "by_id"]);
    }

    #[test]
    fn local_id_key_matches_across_containers() {
        let mut invoker = ComponentEventInvoker::new();
        invoker.add_event_listener("email", "onClick", EventBoundListener::new("any_email"));
        invoker.add_event_listener("billing.email", "onClick", EventBoundListener::new("billing"));

        assert_eq!(invoker.listeners_for(&path("form.email"), "onClick").len(), 1);
        assert_eq!(invoker.listeners_for(&path("billing.email"), "onClick").len(), 2);
        assert!(invoker.listeners_for(&path("form.name"), "onClick").is_empty());
    }

    #[test]
    fn top_level_component_is_not_counted_twice() {
        let mut invoker = ComponentEventInvoker::new();
        invoker.add_event_listener("logout", "trigger", EventBoundListener::new("bye"));
        assert_eq!(invoker.listeners_for(&path("logout"), "trigger").len(), 1);
    }

    #[test]
    fn submission_trigger_defaults_to_form() {
        let form = path("form");
        let trigger = Trigger::from_submission(&form, "Home", Some(""), Some("")).expect("trigger");
        assert_eq!(trigger, Trigger::component(form.clone()));

        let field = Trigger::from_submission(&form, "Home", Some("form.email"), None).expect("trigger");
        assert_eq!(field.id_path().as_str(), "form.email");
        assert_eq!(field.event(), Trigger::DEFAULT_EVENT);
    }

    #[test]
    fn malformed_submission_trigger_not_found() {
        let err = Trigger::from_submission(&path("form"), "Home", Some("form..email"), Some("onClick"))
            .expect_err("bad path");
        match err {
            EventError::TriggerNotFound { page, path, event } => {
                assert_eq!(page, "Home");
                assert_eq!(path, "form..email");
                assert_eq!(event, "onClick");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn default_trigger_event() {
        let trigger = Trigger::component(path("form"));
        assert_eq!(trigger.event(), Trigger::DEFAULT_EVENT);
        assert_eq!(trigger.id_path().as_str(), "form");
    }
}
