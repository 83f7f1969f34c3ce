//! The engine: dispatches requests to services and recovers from failures.
//!
//! # Request Flow
//!
//! ```text
//! WebRequest
//!     │
//!     ▼
//! ┌────────────┐  decode path  ┌─────────────┐  service()  ┌──────────────┐
//! │  Dispatch  │ ────────────► │ ServiceMap  │ ──────────► │ EngineService│
//! └────────────┘               └─────────────┘             └──────┬───────┘
//!                                                                 │
//!                         Ok(WebResponse) ◄───────────────────────┤
//!                                                                 │ Err
//!                                                                 ▼
//!                                              ┌───────────────────────────────┐
//!                                              │ recover by ErrorKind           │
//!                                              │  StaleLink    → StaleLink page │
//!                                              │  StaleSession → page/redirect  │
//!                                              │  Config/Valid → report, 500    │
//!                                              │  Io           → caller         │
//!                                              └───────────────────────────────┘
//!     │
//!     ▼
//! Cleanup (always): pages back to the pool, uploads deleted
//! ```

use std::sync::Arc;
use tessera_component::Cycle;
use tessera_markup::MarkupWriter;
use tessera_types::{service, ErrorCode};
use tracing::{debug, info, warn};

use crate::codec::LinkCodec;
use crate::config::TesseraConfig;
use crate::cycle::RequestCycle;
use crate::locale::RequestLocaleManager;
use crate::pool::PageSource;
use crate::reporter::{ExceptionReport, ExceptionReporter, TracingReporter};
use crate::request::{WebRequest, WebResponse};
use crate::service::{EngineService, ServiceMap};
use crate::specification::{
    ApplicationSpecification, EXCEPTION_PAGE, STALE_LINK_PAGE, STALE_SESSION_PAGE,
};
use crate::{CyclePhase, EngineError, ErrorKind};

/// Body of the last-resort response when even the `Exception` page fails.
const FALLBACK_BODY: &str = "<h1>Internal Server Error</h1>";

/// Assembles an [`Engine`].
///
/// # Example
///
/// ```
/// use tessera_component::builtin::Insert;
/// use tessera_runtime::{ApplicationSpecification, EngineBuilder, PageDefinition, WebRequest};
///
/// let spec = ApplicationSpecification::new("hello").page(
///     "Home",
///     PageDefinition::new(|builder| {
///         builder.add(builder.root(), "greeting", Insert::literal("Hello"))?;
///         Ok(())
///     }),
/// );
/// let engine = EngineBuilder::new(spec).build().unwrap();
///
/// let response = engine.service(WebRequest::new("/app")).unwrap();
/// assert_eq!(response.status, 200);
/// assert_eq!(response.body, "Hello");
/// ```
pub struct EngineBuilder {
    specification: ApplicationSpecification,
    config: TesseraConfig,
    reporter: Arc<dyn ExceptionReporter>,
    services: Vec<Box<dyn EngineService>>,
}

impl EngineBuilder {
    #[must_use]
    pub fn new(specification: ApplicationSpecification) -> Self {
        Self {
            specification,
            config: TesseraConfig::default(),
            reporter: Arc::new(TracingReporter),
            services: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: TesseraConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn reporter(mut self, reporter: Arc<dyn ExceptionReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Adds an application service next to the built-in ones.
    #[must_use]
    pub fn service(mut self, service: Box<dyn EngineService>) -> Self {
        self.services.push(service);
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// - [`EngineError::DuplicateService`] for a service name used twice
    /// - [`EngineError::UnknownPage`] if the home page is not defined
    pub fn build(self) -> Result<Engine, EngineError> {
        let mut services = ServiceMap::with_defaults();
        for service in self.services {
            services.register(service)?;
        }

        let home = &self.config.engine.home_page;
        if !self.specification.has_page(home) {
            return Err(EngineError::UnknownPage(home.clone()));
        }

        let codec = LinkCodec::new(&self.config.engine.servlet_path);
        let locale_manager = RequestLocaleManager::new(&self.config.locale, codec.servlet_path());
        info!(
            application = self.specification.name(),
            servlet_path = codec.servlet_path(),
            home = %home,
            services = ?services.names(),
            reset_enabled = self.config.engine.reset_service_enabled,
            "engine created"
        );

        Ok(Engine {
            source: PageSource::new(self.specification, self.config.pool.max_idle_per_page),
            config: self.config,
            services,
            codec,
            locale_manager,
            reporter: self.reporter,
        })
    }
}

/// Serves requests for one application.
///
/// Shared across threads; each request gets its own [`RequestCycle`].
pub struct Engine {
    config: TesseraConfig,
    source: PageSource,
    services: ServiceMap,
    codec: LinkCodec,
    locale_manager: RequestLocaleManager,
    reporter: Arc<dyn ExceptionReporter>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("source", &self.source)
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}

impl Engine {
    #[must_use]
    pub fn config(&self) -> &TesseraConfig {
        &self.config
    }

    #[must_use]
    pub fn specification(&self) -> &ApplicationSpecification {
        self.source.specification()
    }

    #[must_use]
    pub fn page_source(&self) -> &PageSource {
        &self.source
    }

    #[must_use]
    pub fn services(&self) -> &ServiceMap {
        &self.services
    }

    #[must_use]
    pub fn codec(&self) -> &LinkCodec {
        &self.codec
    }

    #[must_use]
    pub fn locale_manager(&self) -> &RequestLocaleManager {
        &self.locale_manager
    }

    /// Discards pooled pages; returns how many were dropped.
    pub fn reset(&self) -> usize {
        self.source.pool().clear()
    }

    /// Answers one request.
    ///
    /// Stale, configuration and validation failures become fallback pages;
    /// only I/O failures reach the caller.
    ///
    /// # Errors
    ///
    /// Failures of [`ErrorKind::Io`].
    pub fn service(&self, mut request: WebRequest) -> Result<WebResponse, EngineError> {
        let mut cycle = RequestCycle::new(self, &request);
        debug!(cycle = %cycle.id(), path = request.path(), "request started");

        let response = match self.dispatch(&mut cycle, &mut request) {
            Ok(response) => Ok(response),
            Err(err) => self.recover(&mut cycle, err),
        };

        if let Err(err) = cycle.cleanup() {
            self.report(&cycle, &err);
        }
        let mut response = response?;
        if let Some(cookie) = cycle.persist_locale() {
            response.cookies.push(cookie);
        }
        debug!(cycle = %cycle.id(), status = response.status, "request finished");
        Ok(response)
    }

    fn dispatch(
        &self,
        cycle: &mut RequestCycle<'_>,
        request: &mut WebRequest,
    ) -> Result<WebResponse, EngineError> {
        cycle.load(request)?;
        let decoded = self.codec.decode(request.path())?;
        let name = decoded.service.as_deref().unwrap_or(service::HOME);
        let handler = self
            .services
            .get(name)
            .ok_or_else(|| EngineError::UnknownService(name.to_string()))?;
        cycle.set_service(name);
        debug!(cycle = %cycle.id(), service = name, context = ?decoded.context, "dispatching");
        handler.service(cycle, &decoded.context)
    }

    /// Renders the cycle's active page.
    ///
    /// A listener may have activated a different page than the service did;
    /// that page is obtained here.
    ///
    /// # Errors
    ///
    /// Phase, activation or render failures.
    pub fn render(&self, cycle: &mut RequestCycle<'_>) -> Result<WebResponse, EngineError> {
        cycle.enter(CyclePhase::Render)?;
        let name = cycle.page_name().to_string();
        cycle.ensure_page(&name)?;
        let body = cycle.with_page(&name, |page, cycle| {
            let mut writer = MarkupWriter::html(Vec::new());
            page.render(&mut writer, cycle)?;
            let bytes = writer.finish()?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        })?;
        Ok(WebResponse::html(body))
    }

    fn recover(
        &self,
        cycle: &mut RequestCycle<'_>,
        err: EngineError,
    ) -> Result<WebResponse, EngineError> {
        match err.kind() {
            ErrorKind::Io => Err(err),
            ErrorKind::StaleSession => {
                warn!(cycle = %cycle.id(), error = %err, "stale session");
                if self.config.engine.redirect_on_stale {
                    let link = self
                        .codec
                        .link(service::PAGE, vec![STALE_SESSION_PAGE.to_string()], Vec::new());
                    return Ok(WebResponse::redirect(link.url(None)));
                }
                self.render_fallback(cycle, STALE_SESSION_PAGE, &err, 200)
            }
            ErrorKind::StaleLink => {
                warn!(cycle = %cycle.id(), error = %err, "stale link");
                self.render_fallback(cycle, STALE_LINK_PAGE, &err, 200)
            }
            ErrorKind::Configuration | ErrorKind::Validation => {
                self.report(cycle, &err);
                self.render_fallback(cycle, EXCEPTION_PAGE, &err, 500)
            }
        }
    }

    fn report(&self, cycle: &RequestCycle<'_>, err: &EngineError) {
        let report = ExceptionReport::new(cycle.id(), Some(cycle.page_name()), err);
        self.reporter.report(err.kind(), &report);
    }

    fn render_fallback(
        &self,
        cycle: &mut RequestCycle<'_>,
        page: &str,
        err: &EngineError,
        status: u16,
    ) -> Result<WebResponse, EngineError> {
        cycle.restart();
        match self.render_fallback_page(cycle, page, err) {
            Ok(response) => Ok(response.with_status(status)),
            Err(failure) if failure.kind() == ErrorKind::Io => Err(failure),
            Err(failure) => {
                self.report(cycle, &failure);
                Ok(WebResponse::html(FALLBACK_BODY).with_status(500))
            }
        }
    }

    fn render_fallback_page(
        &self,
        cycle: &mut RequestCycle<'_>,
        page: &str,
        err: &EngineError,
    ) -> Result<WebResponse, EngineError> {
        cycle.activate_page(page)?;
        let report = ExceptionReport::new(cycle.id(), None, err);
        let debug = self.config.debug;
        cycle.with_page(page, |page, _| {
            page.set_property("message", report.message.clone().into());
            page.set_property("code", report.code.clone().into());
            if debug {
                page.set_property("chain", report.chain.join("\n").into());
            }
            Ok(())
        })?;
        self.render(cycle)
    }
}
