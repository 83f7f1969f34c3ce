//! Test harness for pages and components.
//!
//! Drives a [`Page`] through render, rewind and trigger without the
//! runtime engine: [`MockCycle`] stands in for the request cycle and
//! builds links the way the runtime's services do.
//!
//! # Example
//!
//! ```
//! use tessera_component::builtin::{Form, TextField};
//! use tessera_component::testing::PageTestHarness;
//! use tessera_component::PageBuilder;
//! use serde_json::json;
//!
//! let mut builder = PageBuilder::new("Signup");
//! let form = builder.add(builder.root(), "form", Form::new().listener("save")).unwrap();
//! builder.add(form, "email", TextField::new("email")).unwrap();
//! builder.listener("save", |ctx| {
//!     let email = ctx.property_text("email").unwrap_or_default();
//!     ctx.set_property("saved", json!(email));
//!     Ok(())
//! });
//! let mut harness = PageTestHarness::new(builder.build().unwrap());
//!
//! let html = harness.submit("form", &[("form.email", "ada@example.com")]).unwrap();
//! assert!(html.contains(r#"value="ada@example.com""#));
//! assert_eq!(harness.page().property("saved"), Some(&json!("ada@example.com")));
//! assert_eq!(harness.log().len(), 3);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tessera_event::Trigger;
use tessera_markup::{MarkupWrite, MarkupWriter};
use tessera_types::{service, CycleId, ErrorCode, IdPath, Link, Locale};

use crate::builtin::Form;
use crate::cycle::direct_context;
use crate::{ComponentAddress, ComponentError, Cycle, Page, ValidationDelegate};

/// Servlet path used by [`MockCycle`] links.
pub const MOCK_SERVLET_PATH: &str = "/app";

/// An in-memory request cycle.
///
/// Pages added with [`add_page`](Self::add_page) stand in for the pages a
/// runtime cycle would obtain when a block from another page is rendered.
#[derive(Debug)]
pub struct MockCycle {
    id: CycleId,
    page: String,
    rewinding: bool,
    stateful: bool,
    attributes: HashMap<String, Value>,
    parameters: HashMap<String, Vec<String>>,
    service_parameters: Vec<String>,
    locale: Locale,
    validation: ValidationDelegate,
    pages: HashMap<String, Page>,
}

impl MockCycle {
    #[must_use]
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            id: CycleId::new(),
            page: page.into(),
            rewinding: false,
            stateful: false,
            attributes: HashMap::new(),
            parameters: HashMap::new(),
            service_parameters: Vec::new(),
            locale: Locale::language_only("en"),
            validation: ValidationDelegate::new(),
            pages: HashMap::new(),
        }
    }

    /// Pretends a session is established; direct links encode `1`.
    #[must_use]
    pub fn stateful(mut self) -> Self {
        self.stateful = true;
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Appends a value to a query or form parameter.
    pub fn add_parameter(&mut self, name: &str, value: &str) {
        self.parameters
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
    }

    pub fn clear_parameters(&mut self) {
        self.parameters.clear();
    }

    /// Makes `page` available to [`Cycle::render_block`].
    pub fn add_page(&mut self, page: Page) {
        self.pages.insert(page.name().to_string(), page);
    }

    /// A page added with [`add_page`](Self::add_page).
    #[must_use]
    pub fn other_page(&self, name: &str) -> Option<&Page> {
        self.pages.get(name)
    }
}

impl Cycle for MockCycle {
    fn id(&self) -> CycleId {
        self.id
    }

    fn page_name(&self) -> &str {
        &self.page
    }

    fn activate(&mut self, page: &str) {
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
        service_name: &str,
        target: &ComponentAddress,
        parameters: Vec<String>,
    ) -> Result<Link, ComponentError> {
        let context = match service_name {
            service::DIRECT => direct_context(self.stateful, &self.page, target),
            service::PAGE => vec![target.page.clone()],
            service::HOME => Vec::new(),
            other => {
                return Err(ComponentError::LinkFailed {
                    service: other.to_string(),
                    message: "not supported by the mock cycle".into(),
                })
            }
        };
        Ok(Link::new(MOCK_SERVLET_PATH, service_name, context, parameters))
    }

    fn render_block(
        &mut self,
        page: &str,
        block: &IdPath,
        writer: &mut dyn MarkupWrite,
    ) -> Result<(), ComponentError> {
        let mut other = self
            .pages
            .remove(page)
            .ok_or_else(|| ComponentError::PageUnavailable {
                page: page.to_string(),
                message: "not added to the mock cycle".into(),
            })?;
        let result = other.render_block(block, writer, self);
        self.pages.insert(page.to_string(), other);
        result
    }
}

/// Which walk a [`WalkRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Walk {
    Render,
    Rewind,
    Trigger,
}

/// One harness operation and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkRecord {
    pub walk: Walk,
    /// Trigger path, or the page name for renders.
    pub target: String,
    /// Error code on failure.
    pub error: Option<String>,
}

/// Drives one page against a [`MockCycle`].
pub struct PageTestHarness {
    page: Page,
    cycle: MockCycle,
    log: Vec<WalkRecord>,
}

impl PageTestHarness {
    #[must_use]
    pub fn new(page: Page) -> Self {
        let cycle = MockCycle::new(page.name());
        Self::with_cycle(page, cycle)
    }

    #[must_use]
    pub fn with_cycle(page: Page, cycle: MockCycle) -> Self {
        Self {
            page,
            cycle,
            log: Vec::new(),
        }
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    #[must_use]
    pub fn cycle(&self) -> &MockCycle {
        &self.cycle
    }

    pub fn cycle_mut(&mut self) -> &mut MockCycle {
        &mut self.cycle
    }

    #[must_use]
    pub fn log(&self) -> &[WalkRecord] {
        &self.log
    }

    /// Renders the page to an HTML string.
    ///
    /// # Errors
    ///
    /// The first component or writer failure.
    pub fn render(&mut self) -> Result<String, ComponentError> {
        let result = self.render_page();
        let target = self.page.name().to_string();
        self.record(Walk::Render, target, &result);
        result
    }

    fn render_page(&mut self) -> Result<String, ComponentError> {
        let mut writer = MarkupWriter::html(Vec::new());
        self.page.render(&mut writer, &mut self.cycle)?;
        let bytes = writer.finish()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Rewinds the page with `id_path` / `event` as trigger.
    ///
    /// # Errors
    ///
    /// [`ComponentError::InvalidId`] for an unparsable path, otherwise as
    /// [`Page::rewind`].
    pub fn rewind(&mut self, id_path: &str, event: &str) -> Result<(), ComponentError> {
        let result = parse_path(id_path).and_then(|path| {
            let trigger = Trigger::new(path, event);
            self.page.rewind(&mut self.cycle, &trigger)
        });
        self.record(Walk::Rewind, id_path.to_string(), &result);
        result
    }

    /// Triggers the direct component at `id_path`.
    ///
    /// # Errors
    ///
    /// As [`Page::trigger`].
    pub fn trigger(&mut self, id_path: &str) -> Result<(), ComponentError> {
        let result = parse_path(id_path).and_then(|path| self.page.trigger(&path, &mut self.cycle));
        self.record(Walk::Trigger, id_path.to_string(), &result);
        result
    }

    /// Posts `fields` to the form at `form`, then renders the page.
    ///
    /// Mirrors a direct-service submission: rewind with the trigger the
    /// fields name (the form by default), trigger the form, render.
    ///
    /// # Errors
    ///
    /// The first failing step.
    pub fn submit(&mut self, form: &str, fields: &[(&str, &str)]) -> Result<String, ComponentError> {
        self.cycle.clear_parameters();
        for (name, value) in fields {
            self.cycle.add_parameter(name, value);
        }
        let path = parse_path(form)?;
        let trigger = Form::submitted_trigger(&path, self.page.name(), &self.cycle)?;
        self.rewind(trigger.id_path().as_str(), trigger.event())?;
        self.trigger(form)?;
        self.render()
    }

    /// Resets page and cycle state between simulated requests.
    pub fn detach(&mut self) {
        self.page.detach();
        self.cycle.clear_parameters();
        self.cycle.validation_mut().clear();
    }

    fn record<T>(&mut self, walk: Walk, target: String, result: &Result<T, ComponentError>) {
        self.log.push(WalkRecord {
            walk,
            target,
            error: result.as_ref().err().map(|err| err.code().to_string()),
        });
    }
}

fn parse_path(id_path: &str) -> Result<IdPath, ComponentError> {
    IdPath::parse(id_path).map_err(|_| ComponentError::InvalidId(id_path.to_string()))
}
