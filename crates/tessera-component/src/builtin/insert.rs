use serde::{Deserialize, Serialize};
use tessera_markup::MarkupWrite;

use super::Binding;
use crate::{Component, ComponentContext, ComponentError};

/// Writes a value as text.
///
/// With `raw` set the value is written without escaping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    value: Binding,
    #[serde(default)]
    raw: bool,
}

impl Insert {
    #[must_use]
    pub fn new(value: Binding) -> Self {
        Self { value, raw: false }
    }

    /// Inserts the named page property.
    #[must_use]
    pub fn property(name: impl Into<String>) -> Self {
        Self::new(Binding::property(name))
    }

    /// Inserts fixed text.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(Binding::literal(text.into()))
    }

    #[must_use]
    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }
}

impl Component for Insert {
    fn type_name(&self) -> &'static str {
        "Insert"
    }

    fn render(
        &mut self,
        writer: &mut dyn MarkupWrite,
        ctx: &mut ComponentContext<'_>,
    ) -> Result<(), ComponentError> {
        let text = self.value.text(ctx);
        if self.raw {
            writer.print_raw(&text)?;
        } else {
            writer.print(&text)?;
        }
        Ok(())
    }
}
