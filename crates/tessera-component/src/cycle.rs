//! The request cycle as seen by components.
//!
//! The runtime owns the concrete request cycle; components and listeners
//! only see this trait. It gives access to request-scoped attributes, the
//! decoded query and service parameters, the validation delegate and link
//! construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tessera_markup::MarkupWrite;
use tessera_types::{CycleId, IdPath, Link, Locale};

use crate::{ComponentError, ValidationDelegate};

/// Where a component lives: its page and its id path within it.
///
/// A root path addresses the page itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentAddress {
    pub page: String,
    pub id_path: IdPath,
}

impl ComponentAddress {
    #[must_use]
    pub fn new(page: impl Into<String>, id_path: IdPath) -> Self {
        Self {
            page: page.into(),
            id_path,
        }
    }

    /// Address of a page as a whole.
    #[must_use]
    pub fn page(page: impl Into<String>) -> Self {
        Self::new(page, IdPath::root())
    }
}

impl fmt::Display for ComponentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id_path.is_root() {
            f.write_str(&self.page)
        } else {
            write!(f, "{}/{}", self.page, self.id_path)
        }
    }
}

/// Stateful token in a direct context when a session was established.
pub const STATEFUL_ON: &str = "1";

/// Stateful token in a direct context without a session.
pub const STATEFUL_OFF: &str = "0";

/// Context of a direct link to `target` rendered on `render_page`.
///
/// Three slots `[stateful, page, id_path]` when the target lives on the
/// page being rendered, four `[stateful, render_page, page, id_path]`
/// otherwise.
#[must_use]
pub fn direct_context(stateful: bool, render_page: &str, target: &ComponentAddress) -> Vec<String> {
    let token = if stateful { STATEFUL_ON } else { STATEFUL_OFF };
    let mut context = vec![token.to_string()];
    if render_page != target.page {
        context.push(render_page.to_string());
    }
    context.push(target.page.clone());
    context.push(target.id_path.to_string());
    context
}

/// Request-cycle services available to components and listeners.
pub trait Cycle {
    fn id(&self) -> CycleId;

    /// Name of the page that will be rendered.
    fn page_name(&self) -> &str;

    /// Selects a different page to render once listeners have run.
    fn activate(&mut self, page: &str);

    fn is_rewinding(&self) -> bool;

    fn set_rewinding(&mut self, rewinding: bool);

    fn attribute(&self, name: &str) -> Option<&Value>;

    fn set_attribute(&mut self, name: &str, value: Value);

    fn remove_attribute(&mut self, name: &str) -> Option<Value>;

    /// All values of a query or form parameter, in submission order.
    fn parameters(&self, name: &str) -> &[String];

    /// First value of a query or form parameter.
    fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters(name).first().map(String::as_str)
    }

    /// Application parameters decoded from the service URL.
    fn service_parameters(&self) -> &[String];

    fn set_service_parameters(&mut self, parameters: Vec<String>);

    fn locale(&self) -> &Locale;

    /// Changes the locale; the runtime persists it in the locale cookie.
    fn set_locale(&mut self, locale: Locale);

    fn validation(&self) -> &ValidationDelegate;

    fn validation_mut(&mut self) -> &mut ValidationDelegate;

    /// Builds a link through the named service.
    ///
    /// # Errors
    ///
    /// [`ComponentError::LinkFailed`] for an unknown service or a service
    /// that rejects the target.
    fn build_link(
        &self,
        service: &str,
        target: &ComponentAddress,
        parameters: Vec<String>,
    ) -> Result<Link, ComponentError>;

    /// Renders the body of the block at `block` on another page.
    ///
    /// The page is obtained for the rest of the request if the cycle does
    /// not hold it yet. Links inside the block are built against the page
    /// being rendered, so direct links carry both page names.
    ///
    /// # Errors
    ///
    /// [`ComponentError::PageUnavailable`] when the page cannot be
    /// obtained, otherwise as [`Page::render_block`](crate::Page::render_block).
    fn render_block(
        &mut self,
        page: &str,
        block: &IdPath,
        writer: &mut dyn MarkupWrite,
    ) -> Result<(), ComponentError>;
}
