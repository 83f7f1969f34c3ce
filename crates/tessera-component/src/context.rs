//! The view a component gets of its page while it renders or rewinds.

use serde_json::Value;
use tessera_markup::MarkupWrite;
use tessera_types::{IdPath, Link};

use crate::page::{NodeId, Page};
use crate::{ComponentAddress, ComponentError, Cycle};

/// Access to the owning page, the cycle and the component's children.
///
/// A context is created by the page for exactly one component call. The
/// component itself is detached from the tree for the duration of the
/// call, so its children can be rendered through
/// [`render_body`](Self::render_body).
pub struct ComponentContext<'a> {
    page: &'a mut Page,
    cycle: &'a mut dyn Cycle,
    node: NodeId,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(page: &'a mut Page, cycle: &'a mut dyn Cycle, node: NodeId) -> Self {
        Self { page, cycle, node }
    }

    pub fn cycle(&mut self) -> &mut dyn Cycle {
        &mut *self.cycle
    }

    #[must_use]
    pub fn cycle_ref(&self) -> &dyn Cycle {
        &*self.cycle
    }

    #[must_use]
    pub fn page_name(&self) -> &str {
        self.page.name()
    }

    #[must_use]
    pub fn id_path(&self) -> &IdPath {
        self.page.node_path(self.node)
    }

    #[must_use]
    pub fn address(&self) -> ComponentAddress {
        ComponentAddress::new(self.page.name(), self.id_path().clone())
    }

    #[must_use]
    pub fn is_rewinding(&self) -> bool {
        self.page.is_rewinding()
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.page.property(name)
    }

    pub fn set_property(&mut self, name: &str, value: Value) {
        self.page.set_property(name, value);
    }

    /// Renders the component's children in order.
    ///
    /// # Errors
    ///
    /// The first child failure.
    pub fn render_body(&mut self, writer: &mut dyn MarkupWrite) -> Result<(), ComponentError> {
        for child in self.page.children(self.node).to_vec() {
            self.page.render_node(child, writer, &mut *self.cycle)?;
        }
        Ok(())
    }

    /// Renders the body of a block on `page`, or on this page when `page`
    /// is `None` or names this page.
    ///
    /// # Errors
    ///
    /// As [`Page::render_block`] and [`Cycle::render_block`].
    pub fn render_block(
        &mut self,
        page: Option<&str>,
        block: &IdPath,
        writer: &mut dyn MarkupWrite,
    ) -> Result<(), ComponentError> {
        match page.filter(|page| *page != self.page.name()) {
            Some(other) => self.cycle.render_block(other, block, writer),
            None => self.page.render_block(block, writer, &mut *self.cycle),
        }
    }

    /// Runs one of the page's listener methods.
    ///
    /// # Errors
    ///
    /// [`ComponentError::UnknownListener`] or the listener's own failure.
    pub fn invoke_listener(&mut self, method: &str) -> Result<(), ComponentError> {
        self.page.invoke_listener(method, &mut *self.cycle)
    }

    /// Builds a link addressing this component.
    ///
    /// # Errors
    ///
    /// [`ComponentError::LinkFailed`] from the cycle.
    pub fn build_link(&self, service: &str, parameters: Vec<String>) -> Result<Link, ComponentError> {
        self.cycle.build_link(service, &self.address(), parameters)
    }
}
