use tessera_component::ComponentAddress;
use tessera_types::{service, Link};

use super::EngineService;
use crate::cycle::RequestCycle;
use crate::request::WebResponse;
use crate::EngineError;

/// Renders the configured home page. Requests for the bare servlet path
/// land here.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomeService;

impl EngineService for HomeService {
    fn name(&self) -> &'static str {
        service::HOME
    }

    fn build_link(
        &self,
        cycle: &RequestCycle<'_>,
        _target: &ComponentAddress,
        parameters: Vec<String>,
    ) -> Result<Link, EngineError> {
        Ok(cycle
            .engine()
            .codec()
            .link(service::HOME, Vec::new(), parameters))
    }

    fn service(
        &self,
        cycle: &mut RequestCycle<'_>,
        context: &[String],
    ) -> Result<WebResponse, EngineError> {
        if !context.is_empty() {
            return Err(EngineError::arity(service::HOME, "0", context.len()));
        }
        let engine = cycle.engine();
        cycle.activate_page(&engine.config().engine.home_page)?;
        engine.render(cycle)
    }
}
