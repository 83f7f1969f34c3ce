use serde::{Deserialize, Serialize};
use tessera_markup::MarkupWrite;
use tessera_types::service;

use super::link::render_link;
use super::LinkStyle;
use crate::{Component, ComponentAddress, ComponentContext, ComponentError};

/// A link that renders another page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    page: String,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    anchor: Option<String>,
}

impl PageLink {
    #[must_use]
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[must_use]
    pub fn anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    #[must_use]
    pub fn target_page(&self) -> &str {
        &self.page
    }
}

impl Component for PageLink {
    fn type_name(&self) -> &'static str {
        "PageLink"
    }

    fn render(
        &mut self,
        writer: &mut dyn MarkupWrite,
        ctx: &mut ComponentContext<'_>,
    ) -> Result<(), ComponentError> {
        let link = if self.disabled {
            None
        } else {
            let target = ComponentAddress::page(self.page.as_str());
            Some(ctx.cycle_ref().build_link(service::PAGE, &target, Vec::new())?)
        };
        render_link(writer, ctx, link, self.anchor.as_deref(), LinkStyle::Anchor)
    }
}
