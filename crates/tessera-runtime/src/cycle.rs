//! The request cycle.
//!
//! One [`RequestCycle`] exists per request. It carries everything scoped to
//! that request and owns the leases on every page the request touches:
//!
//! | State | Source |
//! |-------|--------|
//! | parameters | query pairs, then multipart form fields |
//! | service parameters | repeated `sp` query values |
//! | locale | cookie, request preference or configured default |
//! | part map | decoded multipart body |
//! | attributes | set by components while the request runs |
//!
//! Pages are obtained lazily and all go back to the pool in
//! [`cleanup`](RequestCycle::cleanup).

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tessera_component::{ComponentAddress, ComponentError, Cycle, Page, ValidationDelegate};
use tessera_markup::MarkupWrite;
use tessera_types::{CycleId, IdPath, Link, Locale};
use tracing::debug;

use crate::multipart::PartMap;
use crate::pool::PageLease;
use crate::request::{Cookie, SessionState, WebRequest};
use crate::{CyclePhase, Engine, EngineError};

/// Request-scoped state.
pub struct RequestCycle<'e> {
    engine: &'e Engine,
    id: CycleId,
    phase: CyclePhase,
    service: Option<String>,
    page: String,
    rewinding: bool,
    attributes: HashMap<String, Value>,
    parameters: HashMap<String, Vec<String>>,
    service_parameters: Vec<String>,
    locale: Locale,
    request_locale: Locale,
    parts: PartMap,
    validation: ValidationDelegate,
    session: SessionState,
    leases: HashMap<String, PageLease>,
    in_use: HashSet<String>,
}

impl std::fmt::Debug for RequestCycle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut leased: Vec<&String> = self.leases.keys().collect();
        leased.sort();
        f.debug_struct("RequestCycle")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("service", &self.service)
            .field("page", &self.page)
            .field("locale", &self.locale)
            .field("session", &self.session)
            .field("leased", &leased)
            .finish()
    }
}

impl<'e> RequestCycle<'e> {
    /// A cycle in the `Dispatch` phase; nothing is read from the request
    /// beyond its session state until [`load`](Self::load).
    #[must_use]
    pub fn new(engine: &'e Engine, request: &WebRequest) -> Self {
        let locale = engine.config().locale.default.clone();
        Self {
            engine,
            id: CycleId::new(),
            phase: CyclePhase::Dispatch,
            service: None,
            page: engine.config().engine.home_page.clone(),
            rewinding: false,
            attributes: HashMap::new(),
            parameters: HashMap::new(),
            service_parameters: Vec::new(),
            request_locale: locale.clone(),
            locale,
            parts: PartMap::default(),
            validation: ValidationDelegate::new(),
            session: request.session(),
            leases: HashMap::new(),
            in_use: HashSet::new(),
        }
    }

    /// Reads locale, parameters and the multipart body from `request`.
    ///
    /// # Errors
    ///
    /// A bad locale cookie or a rejected multipart body.
    pub fn load(&mut self, request: &mut WebRequest) -> Result<(), EngineError> {
        let locale = self.engine.locale_manager().extract(request)?;
        self.request_locale = locale.clone();
        self.locale = locale;

        for (name, value) in request.query() {
            self.parameters
                .entry(name.clone())
                .or_default()
                .push(value.clone());
        }
        self.service_parameters = request.service_parameters();

        if let Some(body) = request.take_multipart() {
            self.parts = PartMap::decode(body, &self.engine.config().multipart)?;
            for (name, values) in self.parts.values() {
                self.parameters
                    .entry(name.to_string())
                    .or_default()
                    .extend(values.iter().cloned());
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    #[must_use]
    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidPhase`] for an illegal transition.
    pub fn enter(&mut self, next: CyclePhase) -> Result<(), EngineError> {
        if !self.phase.can_transition(next) {
            return Err(EngineError::InvalidPhase {
                from: self.phase,
                to: next,
            });
        }
        debug!(cycle = %self.id, from = ?self.phase, to = ?next, "phase transition");
        self.phase = next;
        Ok(())
    }

    #[must_use]
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub(crate) fn set_service(&mut self, service: &str) {
        self.service = Some(service.to_string());
    }

    #[must_use]
    pub fn session(&self) -> SessionState {
        self.session
    }

    #[must_use]
    pub fn has_established_session(&self) -> bool {
        self.session == SessionState::Established
    }

    #[must_use]
    pub fn parts(&self) -> &PartMap {
        &self.parts
    }

    /// Locale the request arrived with.
    #[must_use]
    pub fn request_locale(&self) -> &Locale {
        &self.request_locale
    }

    /// Enters `Activate` with `name` as the active page.
    ///
    /// # Errors
    ///
    /// An illegal phase transition, or any [`ensure_page`](Self::ensure_page)
    /// failure.
    pub fn activate_page(&mut self, name: &str) -> Result<(), EngineError> {
        self.enter(CyclePhase::Activate)?;
        self.ensure_page(name)?;
        self.page = name.to_string();
        debug!(cycle = %self.id, page = name, "page activated");
        Ok(())
    }

    /// Obtains a lease on `name` unless the cycle already holds one.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnknownPage`]
    /// - [`EngineError::StaleSession`] for a stateful page without an
    ///   established session
    /// - the page's build failure
    pub fn ensure_page(&mut self, name: &str) -> Result<(), EngineError> {
        if self.leases.contains_key(name) || self.in_use.contains(name) {
            return Ok(());
        }
        let definition = self
            .engine
            .specification()
            .definition(name)
            .ok_or_else(|| EngineError::UnknownPage(name.to_string()))?;
        if definition.is_stateful() && !self.has_established_session() {
            return Err(EngineError::StaleSession {
                target: name.to_string(),
            });
        }
        let lease = self.engine.page_source().obtain(name)?;
        self.leases.insert(name.to_string(), lease);
        Ok(())
    }

    /// Runs `f` on the leased page `name` with this cycle alongside.
    ///
    /// While `f` runs the page is in use: a nested `with_page` for the
    /// same name fails rather than obtaining a second instance.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownPage`] if no lease is held or the page is
    /// already in use, else `f`'s error.
    pub fn with_page<R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Page, &mut Self) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let mut lease = self
            .leases
            .remove(name)
            .ok_or_else(|| EngineError::UnknownPage(name.to_string()))?;
        self.in_use.insert(name.to_string());
        let result = f(&mut *lease, self);
        self.in_use.remove(name);
        self.leases.insert(name.to_string(), lease);
        result
    }

    /// Starts over for a fallback page after a failure.
    ///
    /// Every leased page goes back to the pool, request-scoped component
    /// state is dropped and the phase returns to `Dispatch`. Parameters,
    /// locale and uploads are kept.
    pub fn restart(&mut self) {
        self.return_pages();
        self.attributes.clear();
        self.validation.clear();
        self.rewinding = false;
        self.phase = CyclePhase::Dispatch;
    }

    /// Locale cookie to set, if the locale changed during the request.
    #[must_use]
    pub fn persist_locale(&self) -> Option<Cookie> {
        self.engine
            .locale_manager()
            .persist(&self.locale, &self.request_locale)
    }

    /// Returns pages, cleans up uploads and enters `Cleanup`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Upload`] for an upload that could not be deleted.
    pub fn cleanup(&mut self) -> Result<(), EngineError> {
        self.phase = CyclePhase::Cleanup;
        self.return_pages();
        self.attributes.clear();
        debug!(cycle = %self.id, "cycle cleaned up");
        self.parts.cleanup()
    }

    fn return_pages(&mut self) {
        for (_, lease) in self.leases.drain() {
            self.engine.page_source().release(lease);
        }
    }
}

impl Drop for RequestCycle<'_> {
    fn drop(&mut self) {
        self.return_pages();
    }
}

impl Cycle for RequestCycle<'_> {
    fn id(&self) -> CycleId {
        self.id
    }

    fn page_name(&self) -> &str {
        &self.page
    }

    fn activate(&mut self, page: &str) {
        debug!(cycle = %self.id, page, "listener activated page");
        self.page = page.to_string();
    }

    fn is_rewinding(&self) -> bool {
        self.rewinding
    }

    fn set_rewinding(&mut self, rewinding: bool) {
        self.rewinding = rewinding;
    }

    fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_string(), value);
    }

    fn remove_attribute(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    fn parameters(&self, name: &str) -> &[String] {
        self.parameters.get(name).map_or(&[][..], Vec::as_slice)
    }

    fn service_parameters(&self) -> &[String] {
        &self.service_parameters
    }

    fn set_service_parameters(&mut self, parameters: Vec<String>) {
        self.service_parameters = parameters;
    }

    fn locale(&self) -> &Locale {
        &self.locale
    }

    fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    fn validation(&self) -> &ValidationDelegate {
        &self.validation
    }

    fn validation_mut(&mut self) -> &mut ValidationDelegate {
        &mut self.validation
    }

    fn build_link(
        &self,
        service: &str,
        target: &ComponentAddress,
        parameters: Vec<String>,
    ) -> Result<Link, ComponentError> {
        let link_failed = |message: String| ComponentError::LinkFailed {
            service: service.to_string(),
            message,
        };
        let handler = self
            .engine
            .services()
            .get(service)
            .ok_or_else(|| link_failed("no such service".into()))?;
        handler
            .build_link(self, target, parameters)
            .map_err(|e| link_failed(e.to_string()))
    }

    fn render_block(
        &mut self,
        page: &str,
        block: &IdPath,
        writer: &mut dyn MarkupWrite,
    ) -> Result<(), ComponentError> {
        let unavailable = |err: EngineError| match err {
            EngineError::Component(err) => err,
            other => ComponentError::PageUnavailable {
                page: page.to_string(),
                message: other.to_string(),
            },
        };
        self.ensure_page(page).map_err(unavailable)?;
        self.with_page(page, |target, cycle| {
            target.render_block(block, writer, cycle)?;
            Ok(())
        })
        .map_err(unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApplicationSpecification, EngineBuilder, PageDefinition};
    use tessera_component::builtin::Insert;
    use tessera_types::{ErrorCode, IdPath};

    fn engine() -> Engine {
        let spec = ApplicationSpecification::new("test")
            .page(
                "Home",
                PageDefinition::new(|builder| {
                    builder.add(builder.root(), "hello", Insert::literal("hi"))?;
                    Ok(())
                }),
            )
            .page("Account", PageDefinition::new(|_| Ok(())).stateful());
        EngineBuilder::new(spec).build().unwrap()
    }

    #[test]
    fn parameters_merge_query_and_service_values() {
        let engine = engine();
        let mut request = WebRequest::from_url("/app/page/Home?sp=7&name=Ada&name=Bea").unwrap();
        let mut cycle = RequestCycle::new(&engine, &request);
        cycle.load(&mut request).unwrap();

        assert_eq!(cycle.parameters("name"), ["Ada", "Bea"]);
        assert_eq!(cycle.parameter("name"), Some("Ada"));
        assert!(cycle.parameters("missing").is_empty());
        assert_eq!(cycle.service_parameters(), ["7"]);
        assert_eq!(cycle.locale().to_string(), "en");
    }

    #[test]
    fn illegal_phase_rejected() {
        let engine = engine();
        let mut cycle = RequestCycle::new(&engine, &WebRequest::new("/app"));
        let err = cycle.enter(CyclePhase::Render).unwrap_err();
        assert_eq!(err.code(), "ENGINE_INVALID_PHASE");

        cycle.activate_page("Home").unwrap();
        assert_eq!(cycle.phase(), CyclePhase::Activate);
        cycle.enter(CyclePhase::Render).unwrap();
        assert!(cycle.enter(CyclePhase::Rewind).is_err());
    }

    #[test]
    fn stateful_page_needs_session() {
        let engine = engine();
        let mut cycle = RequestCycle::new(&engine, &WebRequest::new("/app"));
        let err = cycle.activate_page("Account").unwrap_err();
        assert_eq!(err.code(), "ENGINE_STALE_SESSION");

        let request = WebRequest::new("/app").with_session(SessionState::Established);
        let mut cycle = RequestCycle::new(&engine, &request);
        assert!(cycle.activate_page("Account").is_ok());
    }

    #[test]
    fn pages_return_to_pool_on_cleanup() {
        let engine = engine();
        let mut cycle = RequestCycle::new(&engine, &WebRequest::new("/app"));
        cycle.activate_page("Home").unwrap();
        assert_eq!(engine.page_source().pool().idle_count("Home"), 0);

        cycle.cleanup().unwrap();
        assert_eq!(cycle.phase(), CyclePhase::Cleanup);
        assert_eq!(engine.page_source().pool().idle_count("Home"), 1);
    }

    #[test]
    fn page_in_use_is_not_leased_twice() {
        let engine = engine();
        let mut cycle = RequestCycle::new(&engine, &WebRequest::new("/app"));
        cycle.activate_page("Home").unwrap();

        let nested = cycle
            .with_page("Home", |_, cycle| {
                cycle.ensure_page("Home")?;
                let mut writer = tessera_markup::MarkupWriter::html(Vec::new());
                Ok(cycle.render_block("Home", &IdPath::parse("hello").unwrap(), &mut writer))
            })
            .unwrap();
        assert_eq!(nested.unwrap_err().code(), "COMPONENT_PAGE_UNAVAILABLE");

        cycle.cleanup().unwrap();
        assert_eq!(engine.page_source().pool().idle_count("Home"), 1);
    }

    #[test]
    fn links_come_from_services() {
        let engine = engine();
        let request = WebRequest::new("/app").with_session(SessionState::Established);
        let cycle = RequestCycle::new(&engine, &request);
        let target = ComponentAddress::new("Home", IdPath::parse("hello").unwrap());

        let link = cycle
            .build_link("direct", &target, vec!["x".into()])
            .unwrap();
        assert_eq!(link.url(None), "/app/direct/1/Home/hello?sp=x");

        let err = cycle.build_link("teleport", &target, Vec::new()).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_LINK_FAILED");
    }

    #[test]
    fn locale_change_is_persisted() {
        let engine = engine();
        let mut cycle = RequestCycle::new(&engine, &WebRequest::new("/app"));
        assert!(cycle.persist_locale().is_none());

        cycle.set_locale(Locale::language_only("fr"));
        let cookie = cycle.persist_locale().unwrap();
        assert_eq!(cookie.value, "fr");
    }
}
