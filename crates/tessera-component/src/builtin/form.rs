use serde::{Deserialize, Serialize};
use tessera_event::Trigger;
use tessera_markup::MarkupWrite;
use tessera_types::{service, IdPath};

use crate::{Component, ComponentContext, ComponentError, Cycle, Direct, FormComponent};

/// HTTP method a form submits with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMethod {
    #[default]
    Post,
    Get,
}

impl FormMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Get => "get",
        }
    }
}

/// A form posting to the direct service.
///
/// Submission rewinds the page, so every field inside the form has parsed
/// its value before the form's own listener runs.
///
/// The form carries two hidden fields, [`Trigger::PATH_PARAMETER`] and
/// [`Trigger::EVENT_PARAMETER`]. They name the form and the default event
/// when rendered; client code that submits on a field event overwrites
/// them so the rewind fires that field's listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Form {
    listener: Option<String>,
    method: FormMethod,
    stateful: bool,
}

impl Default for Form {
    fn default() -> Self {
        Self {
            listener: None,
            method: FormMethod::Post,
            stateful: true,
        }
    }
}

impl Form {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener method run after the fields have been rewound.
    #[must_use]
    pub fn listener(mut self, method: impl Into<String>) -> Self {
        self.listener = Some(method.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: FormMethod) -> Self {
        self.method = method;
        self
    }

    /// Submissions no longer require an established session.
    #[must_use]
    pub fn stateless(mut self) -> Self {
        self.stateful = false;
        self
    }

    /// The trigger a submission of the form at `form` names.
    ///
    /// # Errors
    ///
    /// [`ComponentError::Event`] for a trigger path that does not parse.
    pub fn submitted_trigger(
        form: &IdPath,
        page: &str,
        cycle: &dyn Cycle,
    ) -> Result<Trigger, ComponentError> {
        Ok(Trigger::from_submission(
            form,
            page,
            cycle.parameter(Trigger::PATH_PARAMETER),
            cycle.parameter(Trigger::EVENT_PARAMETER),
        )?)
    }
}

fn hidden(writer: &mut dyn MarkupWrite, name: &str, value: &str) -> Result<(), ComponentError> {
    writer.begin_empty("input")?;
    writer.attribute("type", "hidden")?;
    writer.attribute("name", name)?;
    writer.attribute("value", value)?;
    writer.close_tag()?;
    Ok(())
}

impl Component for Form {
    fn type_name(&self) -> &'static str {
        "Form"
    }

    fn render(
        &mut self,
        writer: &mut dyn MarkupWrite,
        ctx: &mut ComponentContext<'_>,
    ) -> Result<(), ComponentError> {
        let link = ctx.build_link(service::DIRECT, Vec::new())?;
        writer.begin("form")?;
        writer.attribute("method", self.method.as_str())?;
        writer.attribute("action", &link.url(None))?;
        writer.attribute("name", ctx.id_path().as_str())?;
        hidden(writer, Trigger::PATH_PARAMETER, ctx.id_path().as_str())?;
        hidden(writer, Trigger::EVENT_PARAMETER, Trigger::DEFAULT_EVENT)?;
        ctx.render_body(writer)?;
        writer.end_element("form")?;
        Ok(())
    }

    fn as_direct(&mut self) -> Option<&mut dyn Direct> {
        Some(self)
    }

    fn as_form(&mut self) -> Option<&mut dyn FormComponent> {
        Some(self)
    }
}

impl Direct for Form {
    fn is_stateful(&self) -> bool {
        self.stateful
    }

    fn trigger(&mut self, ctx: &mut ComponentContext<'_>) -> Result<(), ComponentError> {
        match &self.listener {
            Some(method) => ctx.invoke_listener(method),
            None => Ok(()),
        }
    }
}

impl FormComponent for Form {
    fn method(&self) -> &'static str {
        self.method.as_str()
    }
}
