use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessera_markup::MarkupWrite;

use crate::validation::ERROR_CLASS;
use crate::{value_text, Component, ComponentContext, ComponentError};

/// Message recorded when a required field is submitted blank.
pub(crate) const REQUIRED_MESSAGE: &str = "is required";

/// A single-line input bound to a page property.
///
/// The input is named by the field's id path. On rewind the submitted
/// value is stored back into the property; a field in error re-displays
/// the rejected input and is followed by its message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextField {
    value: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    disabled: bool,
}

impl TextField {
    /// A field editing the page property `value`.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Renders as a password input.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[must_use]
    pub fn property_name(&self) -> &str {
        &self.value
    }
}

impl Component for TextField {
    fn type_name(&self) -> &'static str {
        "TextField"
    }

    fn render(
        &mut self,
        writer: &mut dyn MarkupWrite,
        ctx: &mut ComponentContext<'_>,
    ) -> Result<(), ComponentError> {
        let name = ctx.id_path().to_string();
        let rejected = ctx
            .cycle_ref()
            .validation()
            .field_error(&name)
            .map(|err| err.value.clone().unwrap_or_default());
        let in_error = rejected.is_some();
        let text = match rejected {
            Some(input) => input,
            None => ctx.property(&self.value).map(value_text).unwrap_or_default(),
        };

        writer.begin_empty("input")?;
        writer.attribute("type", if self.hidden { "password" } else { "text" })?;
        writer.attribute("name", &name)?;
        writer.attribute("value", &text)?;
        if self.disabled {
            writer.attribute_flag("disabled")?;
        }
        if in_error {
            writer.attribute("class", ERROR_CLASS)?;
        }
        writer.close_tag()?;

        ctx.cycle_ref().validation().write_field_suffix(writer, &name)?;
        Ok(())
    }

    fn rewind(&mut self, ctx: &mut ComponentContext<'_>) -> Result<(), ComponentError> {
        if self.disabled {
            return Ok(());
        }
        let name = ctx.id_path().to_string();
        let Some(input) = ctx.cycle_ref().parameter(&name).map(str::to_string) else {
            return Ok(());
        };

        if self.required && input.trim().is_empty() {
            ctx.cycle()
                .validation_mut()
                .record(name, REQUIRED_MESSAGE, Some(input));
            return Ok(());
        }
        ctx.cycle().validation_mut().clear_field(&name);
        ctx.set_property(&self.value, Value::String(input));
        Ok(())
    }
}
