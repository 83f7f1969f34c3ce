//! Application specification: pages, component aliases and fallbacks.
//!
//! Pages are defined either by a build closure over a [`PageBuilder`] or
//! declaratively by a [`PageSpecification`] whose components name an
//! alias:
//!
//! | Alias | Component |
//! |-------|-----------|
//! | `Any` | [`Any`] |
//! | `Insert` | [`Insert`] |
//! | `Form` | [`Form`] |
//! | `TextField` | [`TextField`] |
//! | `DirectLink` | [`DirectLink`] |
//! | `PageLink` | [`PageLink`] |
//! | `ButtonLink` | [`ButtonLink`] |
//! | `Block` | [`Block`] |
//! | `RenderBlock` | [`RenderBlock`] |
//!
//! Applications may add aliases but may not redefine these.
//!
//! The fallback pages `StaleLink`, `StaleSession` and `Exception` exist in
//! every application; defining a page of the same name replaces them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, LazyLock};
use tessera_component::builtin::{
    Any, Block, ButtonLink, DirectLink, Form, Insert, PageLink, RenderBlock, TextField,
};
use tessera_component::{
    Component, ComponentError, Listener, ListenerContext, NodeId, Page, PageBuilder,
};
use tessera_event::ListenerDeclaration;
use tracing::debug;

use crate::EngineError;

/// Page rendered for links to components that no longer exist.
pub const STALE_LINK_PAGE: &str = "StaleLink";
/// Page rendered when a link needs a session that is gone.
pub const STALE_SESSION_PAGE: &str = "StaleSession";
/// Page rendered for configuration and listener failures.
pub const EXCEPTION_PAGE: &str = "Exception";

/// Builds a component from its JSON configuration.
pub type ComponentFactory = fn(&Value) -> Result<Box<dyn Component>, serde_json::Error>;

/// Page activation hook for the external service; receives the link's
/// service parameters.
pub type ExternalHook =
    Arc<dyn Fn(&mut ListenerContext<'_>, &[String]) -> Result<(), ComponentError> + Send + Sync>;

type BuildFn = Arc<dyn Fn(&mut PageBuilder) -> Result<(), ComponentError> + Send + Sync>;

fn factory<C>(config: &Value) -> Result<Box<dyn Component>, serde_json::Error>
where
    C: Component + DeserializeOwned + 'static,
{
    C::deserialize(config).map(|component| Box::new(component) as Box<dyn Component>)
}

static DEFAULT_ALIASES: LazyLock<HashMap<&'static str, ComponentFactory>> = LazyLock::new(|| {
    let mut aliases: HashMap<&'static str, ComponentFactory> = HashMap::new();
    aliases.insert("Any", factory::<Any>);
    aliases.insert("Insert", factory::<Insert>);
    aliases.insert("Form", factory::<Form>);
    aliases.insert("TextField", factory::<TextField>);
    aliases.insert("DirectLink", factory::<DirectLink>);
    aliases.insert("PageLink", factory::<PageLink>);
    aliases.insert("ButtonLink", factory::<ButtonLink>);
    aliases.insert("Block", factory::<Block>);
    aliases.insert("RenderBlock", factory::<RenderBlock>);
    aliases
});

static FALLBACK_PAGES: LazyLock<BTreeMap<&'static str, PageDefinition>> = LazyLock::new(|| {
    let mut pages = BTreeMap::new();
    pages.insert(
        STALE_LINK_PAGE,
        PageDefinition::declared(notice_page(
            "tessera-stale-link",
            "Stale Link",
            "The page you were viewing has changed since the link was rendered.",
        )),
    );
    pages.insert(
        STALE_SESSION_PAGE,
        PageDefinition::declared(notice_page(
            "tessera-stale-session",
            "Stale Session",
            "Your session has timed out.",
        )),
    );
    pages.insert(EXCEPTION_PAGE, PageDefinition::declared(exception_page()));
    pages
});

fn literal(text: &str) -> Value {
    json!({ "value": { "literal": text } })
}

fn property(name: &str) -> Value {
    json!({ "value": { "property": name } })
}

fn element(name: &str, class: Option<&str>) -> Value {
    match class {
        Some(class) => json!({ "element": name, "attributes": { "class": { "literal": class } } }),
        None => json!({ "element": name }),
    }
}

fn notice_page(class: &str, title: &str, text: &str) -> PageSpecification {
    PageSpecification::new()
        .property("message", json!(""))
        .component(
            ComponentSpecification::new("notice", "Any", element("div", Some(class)))
                .child(
                    ComponentSpecification::new("heading", "Any", element("h1", None))
                        .child(ComponentSpecification::new("title", "Insert", literal(title))),
                )
                .child(
                    ComponentSpecification::new("explanation", "Any", element("p", None))
                        .child(ComponentSpecification::new("text", "Insert", literal(text))),
                )
                .child(
                    ComponentSpecification::new("detail", "Any", element("p", None))
                        .child(ComponentSpecification::new("message", "Insert", property("message"))),
                ),
        )
}

fn exception_page() -> PageSpecification {
    PageSpecification::new()
        .property("message", json!(""))
        .property("code", json!(""))
        .property("chain", json!(""))
        .component(
            ComponentSpecification::new("exception", "Any", element("div", Some("tessera-exception")))
                .child(
                    ComponentSpecification::new("heading", "Any", element("h1", None)).child(
                        ComponentSpecification::new("title", "Insert", literal("An exception has occurred.")),
                    ),
                )
                .child(
                    ComponentSpecification::new("code", "Any", element("p", Some("code")))
                        .child(ComponentSpecification::new("value", "Insert", property("code"))),
                )
                .child(
                    ComponentSpecification::new("message", "Any", element("p", Some("message")))
                        .child(ComponentSpecification::new("value", "Insert", property("message"))),
                )
                .child(
                    ComponentSpecification::new("chain", "Any", element("pre", None))
                        .child(ComponentSpecification::new("value", "Insert", property("chain"))),
                ),
        )
}

/// Whether `alias` names a built-in component.
#[must_use]
pub fn is_default_alias(alias: &str) -> bool {
    DEFAULT_ALIASES.contains_key(alias)
}

/// Declarative component: id, alias, configuration and body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpecification {
    pub id: String,
    #[serde(rename = "type")]
    pub alias: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub body: Vec<ComponentSpecification>,
}

impl ComponentSpecification {
    #[must_use]
    pub fn new(id: impl Into<String>, alias: impl Into<String>, config: Value) -> Self {
        Self {
            id: id.into(),
            alias: alias.into(),
            config,
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn child(mut self, child: ComponentSpecification) -> Self {
        self.body.push(child);
        self
    }
}

/// Declarative page: properties, top-level components and listener
/// declarations.
///
/// # Example
///
/// ```
/// use tessera_runtime::PageSpecification;
///
/// let spec: PageSpecification = serde_json::from_str(r#"{
///     "properties": { "name": "Ada" },
///     "components": [
///         { "id": "greeting", "type": "Insert", "config": { "value": { "property": "name" } } }
///     ]
/// }"#).unwrap();
/// assert_eq!(spec.components[0].alias, "Insert");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpecification {
    pub properties: Map<String, Value>,
    pub components: Vec<ComponentSpecification>,
    pub listeners: Vec<ListenerDeclaration>,
}

impl PageSpecification {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn property(mut self, name: &str, value: Value) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    #[must_use]
    pub fn component(mut self, component: ComponentSpecification) -> Self {
        self.components.push(component);
        self
    }

    #[must_use]
    pub fn declare(mut self, declaration: ListenerDeclaration) -> Self {
        self.listeners.push(declaration);
        self
    }
}

#[derive(Clone)]
enum PageRecipe {
    Built(BuildFn),
    Declared(PageSpecification),
}

/// How to build one page, plus its activation rules.
#[derive(Clone)]
pub struct PageDefinition {
    recipe: PageRecipe,
    listeners: BTreeMap<String, Listener>,
    stateful: bool,
    external: Option<ExternalHook>,
}

impl fmt::Debug for PageDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let recipe = match &self.recipe {
            PageRecipe::Built(_) => "built",
            PageRecipe::Declared(_) => "declared",
        };
        f.debug_struct("PageDefinition")
            .field("recipe", &recipe)
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .field("stateful", &self.stateful)
            .field("external", &self.external.is_some())
            .finish()
    }
}

impl PageDefinition {
    /// A page assembled by `build`.
    ///
    /// The closure runs once per fresh instance; pooled instances are
    /// reused.
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&mut PageBuilder) -> Result<(), ComponentError> + Send + Sync + 'static,
    {
        Self {
            recipe: PageRecipe::Built(Arc::new(build)),
            listeners: BTreeMap::new(),
            stateful: false,
            external: None,
        }
    }

    /// A page built from a declarative specification.
    #[must_use]
    pub fn declared(specification: PageSpecification) -> Self {
        Self {
            recipe: PageRecipe::Declared(specification),
            listeners: BTreeMap::new(),
            stateful: false,
            external: None,
        }
    }

    /// Registers a listener method on every instance.
    #[must_use]
    pub fn listener<F>(mut self, method: &str, listener: F) -> Self
    where
        F: Fn(&mut ListenerContext<'_>) -> Result<(), ComponentError> + Send + Sync + 'static,
    {
        self.listeners.insert(method.to_string(), Arc::new(listener));
        self
    }

    /// Activation requires an established session.
    #[must_use]
    pub fn stateful(mut self) -> Self {
        self.stateful = true;
        self
    }

    /// Allows activation through the external service.
    #[must_use]
    pub fn external<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut ListenerContext<'_>, &[String]) -> Result<(), ComponentError>
            + Send
            + Sync
            + 'static,
    {
        self.external = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn is_stateful(&self) -> bool {
        self.stateful
    }

    #[must_use]
    pub fn external_hook(&self) -> Option<&ExternalHook> {
        self.external.as_ref()
    }
}

/// The pages and component aliases of one application.
///
/// # Example
///
/// ```
/// use tessera_component::builtin::Insert;
/// use tessera_runtime::{ApplicationSpecification, PageDefinition};
///
/// let spec = ApplicationSpecification::new("demo").page(
///     "Home",
///     PageDefinition::new(|builder| {
///         builder.add(builder.root(), "hello", Insert::literal("Hello"))?;
///         Ok(())
///     }),
/// );
///
/// assert!(spec.has_page("Home"));
/// assert!(spec.has_page("Exception"));
/// let page = spec.build_page("Home").unwrap();
/// assert_eq!(page.component_count(), 1);
/// ```
#[derive(Clone)]
pub struct ApplicationSpecification {
    name: String,
    pages: BTreeMap<String, PageDefinition>,
    aliases: HashMap<String, ComponentFactory>,
}

impl fmt::Debug for ApplicationSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut aliases: Vec<&String> = self.aliases.keys().collect();
        aliases.sort();
        f.debug_struct("ApplicationSpecification")
            .field("name", &self.name)
            .field("pages", &self.pages)
            .field("aliases", &aliases)
            .finish()
    }
}

impl ApplicationSpecification {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pages: BTreeMap::new(),
            aliases: HashMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds or replaces a page.
    #[must_use]
    pub fn page(mut self, name: impl Into<String>, definition: PageDefinition) -> Self {
        self.pages.insert(name.into(), definition);
        self
    }

    /// Adds an application component alias.
    ///
    /// # Errors
    ///
    /// [`EngineError::AliasRedefined`] for a built-in alias.
    pub fn add_alias(
        &mut self,
        alias: impl Into<String>,
        factory: ComponentFactory,
    ) -> Result<(), EngineError> {
        let alias = alias.into();
        if is_default_alias(&alias) {
            return Err(EngineError::AliasRedefined(alias));
        }
        self.aliases.insert(alias, factory);
        Ok(())
    }

    /// Adds an alias for a deserializable component type.
    ///
    /// # Errors
    ///
    /// As [`add_alias`](Self::add_alias).
    pub fn register<C>(&mut self, alias: impl Into<String>) -> Result<(), EngineError>
    where
        C: Component + DeserializeOwned + 'static,
    {
        self.add_alias(alias, factory::<C>)
    }

    /// Whether `name` is defined, fallback pages included.
    #[must_use]
    pub fn has_page(&self, name: &str) -> bool {
        self.definition(name).is_some()
    }

    /// Application pages, fallbacks excluded.
    pub fn page_names(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// The definition of `name`; application pages shadow fallbacks.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&PageDefinition> {
        self.pages.get(name).or_else(|| FALLBACK_PAGES.get(name))
    }

    /// Creates a component from an alias and its configuration.
    ///
    /// A `null` configuration is read as an empty object.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnknownAlias`]
    /// - [`EngineError::InvalidComponent`] when the configuration does not
    ///   deserialize
    pub fn create_component(
        &self,
        alias: &str,
        id: &str,
        config: &Value,
    ) -> Result<Box<dyn Component>, EngineError> {
        let factory = DEFAULT_ALIASES
            .get(alias)
            .or_else(|| self.aliases.get(alias))
            .ok_or_else(|| EngineError::UnknownAlias(alias.to_string()))?;

        let empty = Value::Object(Map::new());
        let config = if config.is_null() { &empty } else { config };
        factory(config).map_err(|e| EngineError::InvalidComponent {
            alias: alias.to_string(),
            id: id.to_string(),
            message: e.to_string(),
        })
    }

    /// Builds a fresh instance of `name`.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownPage`], alias failures of declarative pages,
    /// or the page builder's failure.
    pub fn build_page(&self, name: &str) -> Result<Page, EngineError> {
        let definition = self
            .definition(name)
            .ok_or_else(|| EngineError::UnknownPage(name.to_string()))?;

        let mut builder = PageBuilder::new(name);
        match &definition.recipe {
            PageRecipe::Built(build) => build(&mut builder)?,
            PageRecipe::Declared(specification) => {
                let root = builder.root();
                for component in &specification.components {
                    self.add_declared(&mut builder, root, component)?;
                }
                for (property, value) in &specification.properties {
                    builder.property(property, value.clone());
                }
                for declaration in &specification.listeners {
                    builder.declare(declaration.clone());
                }
            }
        }
        for (method, listener) in &definition.listeners {
            let listener = Arc::clone(listener);
            builder.listener(method, move |ctx| listener(ctx));
        }

        let page = builder.build()?;
        debug!(page = name, components = page.component_count(), "page built");
        Ok(page)
    }

    fn add_declared(
        &self,
        builder: &mut PageBuilder,
        parent: NodeId,
        specification: &ComponentSpecification,
    ) -> Result<(), EngineError> {
        let component =
            self.create_component(&specification.alias, &specification.id, &specification.config)?;
        let node = builder.add_boxed(parent, &specification.id, component)?;
        for child in &specification.body {
            self.add_declared(builder, node, child)?;
        }
        Ok(())
    }
}
