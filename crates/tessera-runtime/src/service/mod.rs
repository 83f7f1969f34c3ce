//! Engine services.
//!
//! A service is a named strategy that knows how to encode a link to itself
//! and how to answer a request that arrives through such a link.
//!
//! | Service | Context | Answers with |
//! |---------|---------|--------------|
//! | `direct` | `[stateful, page, idPath]` or `[stateful, renderPage, page, idPath]` | rewind (forms), trigger, render |
//! | `page` | `[page]` | render |
//! | `external` | `[page]` + service parameters | activation hook, render |
//! | `home` | `[]` | render of the home page |
//! | `reset` | `[page]` | optional pool reset, render |

mod direct;
mod external;
mod home;
mod page;
mod reset;

pub use direct::DirectService;
pub use external::ExternalService;
pub use home::HomeService;
pub use page::PageService;
pub use reset::ResetService;

use std::collections::HashMap;
use std::fmt;
use tessera_component::ComponentAddress;
use tessera_types::Link;

use crate::cycle::RequestCycle;
use crate::request::WebResponse;
use crate::EngineError;

/// A named request handler.
pub trait EngineService: Send + Sync {
    fn name(&self) -> &'static str;

    /// Link that brings the user back to `target` through this service.
    ///
    /// # Errors
    ///
    /// Service specific; e.g. parameters the service cannot carry.
    fn build_link(
        &self,
        cycle: &RequestCycle<'_>,
        target: &ComponentAddress,
        parameters: Vec<String>,
    ) -> Result<Link, EngineError>;

    /// Answers a request whose path decoded to this service and `context`.
    ///
    /// # Errors
    ///
    /// Any failure of the request; the engine decides how it is answered.
    fn service(
        &self,
        cycle: &mut RequestCycle<'_>,
        context: &[String],
    ) -> Result<WebResponse, EngineError>;
}

/// Services by name.
#[derive(Default)]
pub struct ServiceMap {
    services: HashMap<&'static str, Box<dyn EngineService>>,
}

impl fmt::Debug for ServiceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&&str> = self.services.keys().collect();
        names.sort();
        f.debug_struct("ServiceMap").field("services", &names).finish()
    }
}

impl ServiceMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The five built-in services.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut services: HashMap<&'static str, Box<dyn EngineService>> = HashMap::new();
        for service in [
            Box::new(DirectService) as Box<dyn EngineService>,
            Box::new(PageService),
            Box::new(ExternalService),
            Box::new(HomeService),
            Box::new(ResetService),
        ] {
            services.insert(service.name(), service);
        }
        Self { services }
    }

    /// Adds a service.
    ///
    /// # Errors
    ///
    /// [`EngineError::DuplicateService`] if the name is taken.
    pub fn register(&mut self, service: Box<dyn EngineService>) -> Result<(), EngineError> {
        let name = service.name();
        if self.services.contains_key(name) {
            return Err(EngineError::DuplicateService(name.to_string()));
        }
        self.services.insert(name, service);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn EngineService> {
        self.services.get(name).map(|service| service.as_ref())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.services.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Checks that `context` has exactly one slot and returns it.
pub(crate) fn single_page<'c>(service: &str, context: &'c [String]) -> Result<&'c str, EngineError> {
    match context {
        [page] => Ok(page),
        _ => Err(EngineError::arity(service, "1", context.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::{service, ErrorCode};

    #[test]
    fn defaults_registered() {
        let map = ServiceMap::with_defaults();
        assert_eq!(map.names(), vec!["direct", "external", "home", "page", "reset"]);
        assert!(map.get(service::DIRECT).is_some());
        assert!(map.get("teleport").is_none());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut map = ServiceMap::with_defaults();
        let err = map.register(Box::new(PageService)).unwrap_err();
        assert_eq!(err.code(), "ENGINE_DUPLICATE_SERVICE");

        let mut empty = ServiceMap::new();
        empty.register(Box::new(PageService)).unwrap();
        assert!(empty.contains("page"));
    }

    #[test]
    fn single_page_arity() {
        assert_eq!(single_page("page", &["Home".to_string()]).unwrap(), "Home");
        let err = single_page("page", &[]).unwrap_err();
        assert!(matches!(err, EngineError::ContextArity { actual: 0, .. }));
    }
}
