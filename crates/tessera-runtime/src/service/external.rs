use std::sync::Arc;
use tessera_component::{ComponentAddress, Cycle};
use tessera_types::{service, Link};
use tracing::debug;

use super::{single_page, EngineService};
use crate::cycle::RequestCycle;
use crate::request::WebResponse;
use crate::EngineError;

/// Bookmarkable entry into a page; the service parameters are handed to
/// the page's external activation hook.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalService;

impl EngineService for ExternalService {
    fn name(&self) -> &'static str {
        service::EXTERNAL
    }

    fn build_link(
        &self,
        cycle: &RequestCycle<'_>,
        target: &ComponentAddress,
        parameters: Vec<String>,
    ) -> Result<Link, EngineError> {
        Ok(cycle
            .engine()
            .codec()
            .link(service::EXTERNAL, vec![target.page.clone()], parameters))
    }

    fn service(
        &self,
        cycle: &mut RequestCycle<'_>,
        context: &[String],
    ) -> Result<WebResponse, EngineError> {
        let page_name = single_page(service::EXTERNAL, context)?;
        let engine = cycle.engine();
        let hook = engine
            .specification()
            .definition(page_name)
            .ok_or_else(|| EngineError::UnknownPage(page_name.to_string()))?
            .external_hook()
            .map(Arc::clone)
            .ok_or_else(|| EngineError::NotExternal(page_name.to_string()))?;

        cycle.activate_page(page_name)?;
        let parameters = cycle.service_parameters().to_vec();
        debug!(page = page_name, parameters = parameters.len(), "external activation");
        cycle.with_page(page_name, |page, cycle| {
            page.with_context(cycle, |ctx| hook(ctx, &parameters))?;
            Ok(())
        })?;
        engine.render(cycle)
    }
}
