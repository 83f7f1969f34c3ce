use tessera_component::builtin::Form;
use tessera_component::{direct_context, ComponentAddress, ComponentError, Cycle, STATEFUL_ON};
use tessera_event::EventError;
use tessera_types::{service, IdPath, Link};
use tracing::debug;

use super::EngineService;
use crate::cycle::RequestCycle;
use crate::request::WebResponse;
use crate::{CyclePhase, EngineError};

/// Triggers a component on a page, rewinding the page first when the
/// component is a form.
///
/// A form submission rewinds with the trigger named by the form's
/// `_trigger` / `_event` fields, so field event listeners fire before the
/// form's own listener. A trigger naming no component is a stale link.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectService;

struct DirectTarget<'c> {
    stateful: &'c str,
    render_page: &'c str,
    page: &'c str,
    id_path: &'c str,
}

impl<'c> DirectTarget<'c> {
    fn decode(context: &'c [String]) -> Result<Self, EngineError> {
        match context {
            [stateful, page, id_path] => Ok(Self {
                stateful,
                render_page: page,
                page,
                id_path,
            }),
            [stateful, render_page, page, id_path] => Ok(Self {
                stateful,
                render_page,
                page,
                id_path,
            }),
            _ => Err(EngineError::arity(service::DIRECT, "3 or 4", context.len())),
        }
    }

    fn stale(&self) -> EngineError {
        EngineError::StaleLink {
            page: self.page.to_string(),
            path: self.id_path.to_string(),
        }
    }
}

impl EngineService for DirectService {
    fn name(&self) -> &'static str {
        service::DIRECT
    }

    fn build_link(
        &self,
        cycle: &RequestCycle<'_>,
        target: &ComponentAddress,
        parameters: Vec<String>,
    ) -> Result<Link, EngineError> {
        let context = direct_context(cycle.has_established_session(), cycle.page_name(), target);
        Ok(cycle
            .engine()
            .codec()
            .link(service::DIRECT, context, parameters))
    }

    fn service(
        &self,
        cycle: &mut RequestCycle<'_>,
        context: &[String],
    ) -> Result<WebResponse, EngineError> {
        let target = DirectTarget::decode(context)?;
        cycle.activate_page(target.render_page)?;
        cycle.ensure_page(target.page)?;

        let id_path = IdPath::parse(target.id_path).map_err(|_| target.stale())?;
        cycle.with_page(target.page, |page, cycle| {
            if id_path.is_root() {
                return Err(ComponentError::MissingCapability {
                    path: ComponentAddress::page(target.page).to_string(),
                    capability: "Direct",
                }
                .into());
            }
            let component = page.component_mut(&id_path).ok_or_else(|| target.stale())?;
            let is_form = component.as_form().is_some();
            let stateful = component
                .as_direct()
                .map(|direct| direct.is_stateful())
                .ok_or_else(|| ComponentError::MissingCapability {
                    path: id_path.to_string(),
                    capability: "Direct",
                })?;

            if target.stateful == STATEFUL_ON && stateful && !cycle.has_established_session() {
                return Err(EngineError::StaleSession {
                    target: ComponentAddress::new(target.page, id_path.clone()).to_string(),
                });
            }

            debug!(
                page = target.page,
                component = %id_path,
                form = is_form,
                parameters = cycle.service_parameters().len(),
                "direct request"
            );
            if is_form {
                cycle.enter(CyclePhase::Rewind)?;
                let trigger = Form::submitted_trigger(&id_path, target.page, &*cycle)
                    .map_err(stale_trigger)?;
                debug!(trigger = %trigger.id_path(), event = trigger.event(), "form submitted");
                page.rewind(cycle, &trigger).map_err(stale_trigger)?;
            }
            page.trigger(&id_path, cycle)?;
            Ok(())
        })?;

        cycle.engine().render(cycle)
    }
}

fn stale_trigger(err: ComponentError) -> EngineError {
    match err {
        ComponentError::Event(EventError::TriggerNotFound { page, path, .. }) => {
            EngineError::StaleLink { page, path }
        }
        other => other.into(),
    }
}
