use serde::{Deserialize, Serialize};
use tessera_markup::MarkupWrite;
use tessera_types::service;

use super::link::render_link;
use super::LinkStyle;
use crate::{Component, ComponentAddress, ComponentContext, ComponentError};

/// A push button that navigates to a page.
///
/// ```text
/// <button type="button" onclick="window.location='/app/page/Help'">Help</button>
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonLink {
    page: String,
    #[serde(default)]
    disabled: bool,
}

impl ButtonLink {
    #[must_use]
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            disabled: false,
        }
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

impl Component for ButtonLink {
    fn type_name(&self) -> &'static str {
        "ButtonLink"
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
        render_link(writer, ctx, link, None, LinkStyle::Button)
    }
}
