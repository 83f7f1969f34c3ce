use tessera_component::ComponentAddress;
use tessera_types::{service, Link};

use super::{single_page, EngineService};
use crate::cycle::RequestCycle;
use crate::request::WebResponse;
use crate::EngineError;

/// Activates and renders a page by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageService;

impl EngineService for PageService {
    fn name(&self) -> &'static str {
        service::PAGE
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
            .link(service::PAGE, vec![target.page.clone()], parameters))
    }

    fn service(
        &self,
        cycle: &mut RequestCycle<'_>,
        context: &[String],
    ) -> Result<WebResponse, EngineError> {
        let page = single_page(service::PAGE, context)?;
        cycle.activate_page(page)?;
        cycle.engine().render(cycle)
    }
}
