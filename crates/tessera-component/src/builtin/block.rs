use serde::{Deserialize, Serialize};
use tessera_markup::MarkupWrite;
use tessera_types::IdPath;

use crate::{Component, ComponentContext, ComponentError};

/// Markup kept aside for a [`RenderBlock`].
///
/// A block renders nothing where it stands. Its body is rendered by a
/// `RenderBlock`, on the same page or on any other; components inside keep
/// belonging to the block's page, so their properties and listeners are
/// that page's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {}

impl Block {
    /// Type name a [`Page`](crate::Page) checks before rendering a block.
    pub const TYPE_NAME: &'static str = "Block";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Block {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn render(
        &mut self,
        _writer: &mut dyn MarkupWrite,
        _ctx: &mut ComponentContext<'_>,
    ) -> Result<(), ComponentError> {
        Ok(())
    }
}

/// Renders the body of a [`Block`].
///
/// Without a page the block is looked up on the page being rendered.
/// Direct links inside a block from another page encode both pages, so
/// following one triggers the block's component and renders this page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderBlock {
    #[serde(default)]
    page: Option<String>,
    block: String,
}

impl RenderBlock {
    /// Renders `block` from this page.
    #[must_use]
    pub fn new(block: impl Into<String>) -> Self {
        Self {
            page: None,
            block: block.into(),
        }
    }

    /// Renders `block` from `page`.
    #[must_use]
    pub fn from_page(page: impl Into<String>, block: impl Into<String>) -> Self {
        Self {
            page: Some(page.into()),
            block: block.into(),
        }
    }
}

impl Component for RenderBlock {
    fn type_name(&self) -> &'static str {
        "RenderBlock"
    }

    fn render(
        &mut self,
        writer: &mut dyn MarkupWrite,
        ctx: &mut ComponentContext<'_>,
    ) -> Result<(), ComponentError> {
        let block =
            IdPath::parse(&self.block).map_err(|_| ComponentError::InvalidId(self.block.clone()))?;
        ctx.render_block(self.page.as_deref(), &block, writer)
    }
}
