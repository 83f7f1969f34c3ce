use serde::{Deserialize, Serialize};
use tessera_markup::MarkupWrite;
use tessera_types::service;

use super::link::render_link;
use super::{Binding, LinkStyle};
use crate::{value_text, Component, ComponentContext, ComponentError, Direct};

/// A link that runs a page listener when followed.
///
/// Parameters are resolved at render time and travel as service
/// parameters; the listener reads them back from the cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectLink {
    listener: String,
    parameters: Vec<Binding>,
    stateful: bool,
    disabled: bool,
    anchor: Option<String>,
    style: LinkStyle,
}

impl Default for DirectLink {
    fn default() -> Self {
        Self {
            listener: String::new(),
            parameters: Vec::new(),
            stateful: true,
            disabled: false,
            anchor: None,
            style: LinkStyle::Anchor,
        }
    }
}

impl DirectLink {
    #[must_use]
    pub fn new(listener: impl Into<String>) -> Self {
        Self {
            listener: listener.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn parameter(mut self, binding: Binding) -> Self {
        self.parameters.push(binding);
        self
    }

    #[must_use]
    pub fn stateless(mut self) -> Self {
        self.stateful = false;
        self
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
    pub fn style(mut self, style: LinkStyle) -> Self {
        self.style = style;
        self
    }
}

impl Component for DirectLink {
    fn type_name(&self) -> &'static str {
        "DirectLink"
    }

    fn render(
        &mut self,
        writer: &mut dyn MarkupWrite,
        ctx: &mut ComponentContext<'_>,
    ) -> Result<(), ComponentError> {
        let link = if self.disabled {
            None
        } else {
            let parameters = self
                .parameters
                .iter()
                .map(|binding| value_text(&binding.resolve(ctx)))
                .collect();
            Some(ctx.build_link(service::DIRECT, parameters)?)
        };
        render_link(writer, ctx, link, self.anchor.as_deref(), self.style)
    }

    fn as_direct(&mut self) -> Option<&mut dyn Direct> {
        Some(self)
    }
}

impl Direct for DirectLink {
    fn is_stateful(&self) -> bool {
        self.stateful
    }

    fn trigger(&mut self, ctx: &mut ComponentContext<'_>) -> Result<(), ComponentError> {
        ctx.invoke_listener(&self.listener)
    }
}
