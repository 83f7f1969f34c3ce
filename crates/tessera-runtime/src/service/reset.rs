use tessera_component::ComponentAddress;
use tessera_types::{service, Link};
use tracing::{debug, warn};

use super::{single_page, EngineService};
use crate::cycle::RequestCycle;
use crate::request::WebResponse;
use crate::EngineError;

/// Discards pooled pages, when enabled, then renders a page.
///
/// Anyone can request a reset URL, so the discard only happens with
/// `engine.reset_service_enabled`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetService;

impl EngineService for ResetService {
    fn name(&self) -> &'static str {
        service::RESET
    }

    fn build_link(
        &self,
        cycle: &RequestCycle<'_>,
        target: &ComponentAddress,
        parameters: Vec<String>,
    ) -> Result<Link, EngineError> {
        if !parameters.is_empty() {
            return Err(EngineError::UnexpectedParameters(service::RESET.to_string()));
        }
        Ok(cycle
            .engine()
            .codec()
            .link(service::RESET, vec![target.page.clone()], Vec::new()))
    }

    fn service(
        &self,
        cycle: &mut RequestCycle<'_>,
        context: &[String],
    ) -> Result<WebResponse, EngineError> {
        let page = single_page(service::RESET, context)?;
        let engine = cycle.engine();
        if engine.config().engine.reset_service_enabled {
            let dropped = engine.reset();
            warn!(page, dropped, "engine reset requested");
        } else {
            debug!(page, "reset service disabled, rendering only");
        }
        cycle.activate_page(page)?;
        engine.render(cycle)
    }
}
