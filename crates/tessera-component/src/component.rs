//! Component and capability traits.
//!
//! # Capabilities
//!
//! The engine never downcasts. A component advertises what it can do
//! through explicit accessors that default to `None`:
//!
//! | Accessor | Capability | Used by |
//! |----------|------------|---------|
//! | [`Component::as_direct`] | [`Direct`]: can be triggered by a direct link | `direct` service |
//! | [`Component::as_form`] | [`FormComponent`]: owns posted fields | rewind before trigger |
//!
//! # Listeners
//!
//! Listener methods are page-level closures registered by name. They run
//! with a [`ListenerContext`] that exposes the cycle and the page's
//! properties.

use serde_json::{Map, Value};
use std::sync::Arc;
use tessera_markup::MarkupWrite;

use crate::context::ComponentContext;
use crate::{ComponentError, Cycle};

/// Page properties: named values components bind to.
pub type Properties = Map<String, Value>;

/// A page listener method.
pub type Listener =
    Arc<dyn Fn(&mut ListenerContext<'_>) -> Result<(), ComponentError> + Send + Sync>;

/// A node of a page tree.
///
/// # Example
///
/// ```
/// use tessera_component::{Component, ComponentContext, ComponentError};
/// use tessera_markup::MarkupWrite;
///
/// struct Heading(String);
///
/// impl Component for Heading {
///     fn type_name(&self) -> &'static str {
///         "Heading"
///     }
///
///     fn render(
///         &mut self,
///         writer: &mut dyn MarkupWrite,
///         ctx: &mut ComponentContext<'_>,
///     ) -> Result<(), ComponentError> {
///         writer.begin("h1")?;
///         writer.print(&self.0)?;
///         ctx.render_body(writer)?;
///         writer.end()?;
///         Ok(())
///     }
/// }
/// ```
pub trait Component: Send {
    /// Short type name used in diagnostics and the alias table.
    fn type_name(&self) -> &'static str;

    /// Renders the component; call [`ComponentContext::render_body`] to
    /// render its children.
    fn render(
        &mut self,
        writer: &mut dyn MarkupWrite,
        ctx: &mut ComponentContext<'_>,
    ) -> Result<(), ComponentError>;

    /// Re-derives state from the submitted request during a rewind.
    fn rewind(&mut self, ctx: &mut ComponentContext<'_>) -> Result<(), ComponentError> {
        let _ = ctx;
        Ok(())
    }

    /// Drops per-request state before the page returns to the pool.
    fn detach(&mut self) {}

    fn as_direct(&mut self) -> Option<&mut dyn Direct> {
        None
    }

    fn as_form(&mut self) -> Option<&mut dyn FormComponent> {
        None
    }
}

/// A component that direct links can trigger.
pub trait Direct {
    /// Whether triggering requires an established session.
    fn is_stateful(&self) -> bool;

    fn trigger(&mut self, ctx: &mut ComponentContext<'_>) -> Result<(), ComponentError>;
}

/// A component whose descendants post values.
pub trait FormComponent {
    /// HTTP method the form submits with.
    fn method(&self) -> &'static str {
        "post"
    }
}

/// What a listener method can touch.
pub struct ListenerContext<'a> {
    page_name: &'a str,
    properties: &'a mut Properties,
    cycle: &'a mut dyn Cycle,
}

impl<'a> ListenerContext<'a> {
    pub fn new(page_name: &'a str, properties: &'a mut Properties, cycle: &'a mut dyn Cycle) -> Self {
        Self {
            page_name,
            properties,
            cycle,
        }
    }

    /// Name of the page that owns the listener.
    #[must_use]
    pub fn page_name(&self) -> &str {
        self.page_name
    }

    pub fn cycle(&mut self) -> &mut dyn Cycle {
        &mut *self.cycle
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Property rendered as text; strings are returned unquoted.
    #[must_use]
    pub fn property_text(&self, name: &str) -> Option<String> {
        self.property(name).map(value_text)
    }

    pub fn set_property(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_string(), value);
    }

    /// Selects the page to render after the listener.
    pub fn activate(&mut self, page: &str) {
        self.cycle.activate(page);
    }
}

/// Text form of a property value as shown to users.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
