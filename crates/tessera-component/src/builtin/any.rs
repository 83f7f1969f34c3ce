use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tessera_markup::MarkupWrite;

use super::Binding;
use crate::{value_text, Component, ComponentContext, ComponentError};

/// Renders an arbitrary element around its body.
///
/// Attributes are written in name order; a binding that resolves to
/// `null` or `false` omits its attribute, `true` writes a bare flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Any {
    element: String,
    #[serde(default)]
    attributes: BTreeMap<String, Binding>,
}

impl Any {
    #[must_use]
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, binding: Binding) -> Self {
        self.attributes.insert(name.into(), binding);
        self
    }

    #[must_use]
    pub fn element(&self) -> &str {
        &self.element
    }
}

impl Component for Any {
    fn type_name(&self) -> &'static str {
        "Any"
    }

    fn render(
        &mut self,
        writer: &mut dyn MarkupWrite,
        ctx: &mut ComponentContext<'_>,
    ) -> Result<(), ComponentError> {
        writer.begin(&self.element)?;
        for (name, binding) in &self.attributes {
            match binding.resolve(ctx) {
                Value::Null | Value::Bool(false) => {}
                Value::Bool(true) => writer.attribute_flag(name)?,
                Value::Number(n) => match n.as_i64() {
                    Some(int) => writer.attribute_int(name, int)?,
                    None => writer.attribute(name, &n.to_string())?,
                },
                other => writer.attribute(name, &value_text(&other))?,
            }
        }
        ctx.render_body(writer)?;
        writer.end_element(&self.element)?;
        Ok(())
    }
}
