//! Page trees.
//!
//! A [`Page`] is an arena of component nodes rooted at an implicit root
//! node that stands for the page itself. Nodes are only ever added below
//! an existing node, so the arena is a strict tree.
//!
//! ```text
//! NodeId(0)  root ""            (the page)
//! ├── NodeId(1)  "form"         Form
//! │   ├── NodeId(2) "form.email"   TextField
//! │   └── NodeId(3) "form.save"    DirectLink
//! └── NodeId(4)  "logout"       DirectLink
//!
//! pre-order: 0 1 2 3 4
//! ```
//!
//! # Walks
//!
//! | Walk | Entry point | Order |
//! |------|-------------|-------|
//! | render | [`Page::render`] | each component decides when to render its body |
//! | rewind | [`Page::rewind`] | pre-order over every component, then trigger listeners |
//! | trigger | [`Page::trigger`] | the single addressed [`Direct`](crate::Direct) component |
//! | block | [`Page::render_block`] | the children of one [`Block`](crate::builtin::Block) |
//!
//! While a component runs, it is taken out of its slot; a re-entrant call
//! for the same node fails with [`ComponentError::Busy`].

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tessera_event::{
    ComponentEventInvoker, EventBoundListener, EventError, ListenerDeclaration, Trigger,
};
use tessera_markup::MarkupWrite;
use tessera_types::IdPath;

use crate::builtin::Block;
use crate::component::{Component, Listener, ListenerContext, Properties};
use crate::context::ComponentContext;
use crate::{ComponentError, Cycle};

/// Index of a node within one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The page itself.
    pub const ROOT: Self = Self(0);
}

struct Node {
    id_path: IdPath,
    children: Vec<NodeId>,
    type_name: &'static str,
    component: Option<Box<dyn Component>>,
    listeners: Vec<(String, Listener)>,
}

impl Node {
    fn root() -> Self {
        Self {
            id_path: IdPath::root(),
            children: Vec::new(),
            type_name: "Page",
            component: None,
            listeners: Vec::new(),
        }
    }
}

/// A listener queued by a rewind.
struct PendingListener {
    method: String,
    listener: Listener,
    validate_form: bool,
}

/// A named tree of components plus page properties and listeners.
pub struct Page {
    name: String,
    nodes: Vec<Node>,
    properties: Properties,
    defaults: Properties,
    listeners: HashMap<String, Listener>,
    invoker: ComponentEventInvoker,
    rewinding: bool,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes: Vec<String> = self
            .nodes
            .iter()
            .map(|node| format!("{}:{}", node.id_path, node.type_name))
            .collect();
        let mut listeners: Vec<&String> = self.listeners.keys().collect();
        listeners.sort();
        f.debug_struct("Page")
            .field("name", &self.name)
            .field("nodes", &nodes)
            .field("listeners", &listeners)
            .field("rewinding", &self.rewinding)
            .finish()
    }
}

impl Page {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_rewinding(&self) -> bool {
        self.rewinding
    }

    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn set_property(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_string(), value);
    }

    /// Number of components, not counting the page root.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.nodes.len() - 1
    }

    #[must_use]
    pub fn find(&self, id_path: &IdPath) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| &node.id_path == id_path)
            .map(NodeId)
    }

    #[must_use]
    pub fn contains(&self, id_path: &IdPath) -> bool {
        self.find(id_path).is_some()
    }

    /// Id path of `node`; the root path for ids from another page.
    #[must_use]
    pub fn node_path(&self, node: NodeId) -> &IdPath {
        self.nodes
            .get(node.0)
            .map_or(&self.nodes[0].id_path, |node| &node.id_path)
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map_or(&[][..], |node| node.children.as_slice())
    }

    /// Every node in render order, root first.
    #[must_use]
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    #[must_use]
    pub fn component(&self, id_path: &IdPath) -> Option<&(dyn Component + 'static)> {
        let id = self.find(id_path)?;
        self.nodes[id.0].component.as_deref()
    }

    pub fn component_mut(&mut self, id_path: &IdPath) -> Option<&mut (dyn Component + 'static)> {
        let id = self.find(id_path)?;
        self.nodes[id.0].component.as_deref_mut()
    }

    #[must_use]
    pub fn invoker(&self) -> &ComponentEventInvoker {
        &self.invoker
    }

    #[must_use]
    pub fn has_listener(&self, method: &str) -> bool {
        self.listeners.contains_key(method)
    }

    /// Renders the whole page.
    ///
    /// # Errors
    ///
    /// The first component failure.
    pub fn render(
        &mut self,
        writer: &mut dyn MarkupWrite,
        cycle: &mut dyn Cycle,
    ) -> Result<(), ComponentError> {
        tracing::debug!(page = %self.name, "rendering page");
        self.rewinding = false;
        cycle.set_rewinding(false);
        self.render_node(NodeId::ROOT, writer, cycle)
    }

    pub(crate) fn render_node(
        &mut self,
        id: NodeId,
        writer: &mut dyn MarkupWrite,
        cycle: &mut dyn Cycle,
    ) -> Result<(), ComponentError> {
        if id == NodeId::ROOT {
            for child in self.children(id).to_vec() {
                self.render_node(child, &mut *writer, &mut *cycle)?;
            }
            return Ok(());
        }

        let mut component = self.take_component(id)?;
        let result = {
            let mut ctx = ComponentContext::new(self, cycle, id);
            component.render(writer, &mut ctx)
        };
        self.nodes[id.0].component = Some(component);
        result
    }

    /// Renders the children of the [`Block`](crate::builtin::Block) at
    /// `block`, without the block itself.
    ///
    /// # Errors
    ///
    /// - [`ComponentError::NotFound`] if no component lives at `block`
    /// - [`ComponentError::MissingCapability`] if it is not a block
    /// - [`ComponentError::Busy`] when the block is rendered from inside
    ///   itself
    /// - the first child failure
    pub fn render_block(
        &mut self,
        block: &IdPath,
        writer: &mut dyn MarkupWrite,
        cycle: &mut dyn Cycle,
    ) -> Result<(), ComponentError> {
        let id = self
            .find(block)
            .filter(|id| *id != NodeId::ROOT)
            .ok_or_else(|| ComponentError::NotFound {
                page: self.name.clone(),
                path: block.to_string(),
            })?;
        if self.nodes[id.0].type_name != Block::TYPE_NAME {
            return Err(ComponentError::MissingCapability {
                path: block.to_string(),
                capability: Block::TYPE_NAME,
            });
        }

        tracing::debug!(page = %self.name, block = %block, render_page = cycle.page_name(), "rendering block");
        let component = self.take_component(id)?;
        let mut result = Ok(());
        for child in self.children(id).to_vec() {
            result = self.render_node(child, &mut *writer, &mut *cycle);
            if result.is_err() {
                break;
            }
        }
        self.nodes[id.0].component = Some(component);
        result
    }

    /// Replays a submission against the tree.
    ///
    /// Every component is rewound in pre-order. Afterwards the listeners
    /// bound to the trigger component for the trigger event run: those
    /// bound to the node itself first, then declared listeners. A bare
    /// local id as trigger matches every component with that id, and
    /// their listeners run in tree order. A trigger that names no
    /// component fires the listeners declared for the element with that
    /// id.
    ///
    /// Listeners declared with a form run after that form's fields have
    /// been rewound; with form validation on, they are skipped while the
    /// validation delegate holds errors.
    ///
    /// # Errors
    ///
    /// - [`EventError::TriggerNotFound`] (wrapped) if the trigger path
    ///   addresses no component and no element listener
    /// - [`ComponentError::UnknownListener`] for a declared method the page
    ///   does not define
    /// - the first rewind or listener failure
    pub fn rewind(&mut self, cycle: &mut dyn Cycle, trigger: &Trigger) -> Result<(), ComponentError> {
        let targets = self.trigger_targets(trigger.id_path());
        let mut pending = Vec::new();
        for target in &targets {
            pending.extend(self.trigger_listeners(*target, trigger)?);
        }
        if targets.is_empty() {
            pending = self.element_listeners(trigger)?;
            if pending.is_empty() {
                return Err(EventError::TriggerNotFound {
                    page: self.name.clone(),
                    path: trigger.id_path().to_string(),
                    event: trigger.event().to_string(),
                }
                .into());
            }
        }

        tracing::debug!(
            page = %self.name,
            trigger = %trigger.id_path(),
            event = trigger.event(),
            listeners = pending.len(),
            "rewinding page"
        );

        self.rewinding = true;
        cycle.set_rewinding(true);
        let result = self.rewind_and_fire(cycle, &pending);
        self.rewinding = false;
        cycle.set_rewinding(false);
        result
    }

    fn rewind_and_fire(
        &mut self,
        cycle: &mut dyn Cycle,
        pending: &[PendingListener],
    ) -> Result<(), ComponentError> {
        for id in self.pre_order() {
            if id == NodeId::ROOT {
                continue;
            }
            let mut component = self.take_component(id)?;
            let result = {
                let mut ctx = ComponentContext::new(self, &mut *cycle, id);
                component.rewind(&mut ctx)
            };
            self.nodes[id.0].component = Some(component);
            result?;
        }

        for pending in pending {
            if pending.validate_form && cycle.validation().has_errors() {
                tracing::debug!(
                    page = %self.name,
                    method = %pending.method,
                    "form has errors, listener skipped"
                );
                continue;
            }
            self.run_listener(&pending.method, &pending.listener, &mut *cycle)?;
        }
        Ok(())
    }

    /// The node at `id_path`; failing that, for a single-segment path,
    /// every node with that local id in pre-order.
    fn trigger_targets(&self, id_path: &IdPath) -> Vec<NodeId> {
        if let Some(id) = self.find(id_path) {
            return vec![id];
        }
        if id_path.depth() != 1 {
            return Vec::new();
        }
        self.pre_order()
            .into_iter()
            .filter(|id| *id != NodeId::ROOT && self.nodes[id.0].id_path.leaf() == id_path.leaf())
            .collect()
    }

    fn trigger_listeners(
        &self,
        target: NodeId,
        trigger: &Trigger,
    ) -> Result<Vec<PendingListener>, ComponentError> {
        let node = &self.nodes[target.0];
        let mut pending: Vec<PendingListener> = node
            .listeners
            .iter()
            .filter(|(event, _)| event == trigger.event())
            .map(|(event, listener)| PendingListener {
                method: format!("{}:{event}", node.id_path),
                listener: Arc::clone(listener),
                validate_form: false,
            })
            .collect();

        for bound in self.invoker.listeners_for(&node.id_path, trigger.event()) {
            pending.push(self.bound_listener(bound)?);
        }
        Ok(pending)
    }

    fn element_listeners(&self, trigger: &Trigger) -> Result<Vec<PendingListener>, ComponentError> {
        let Some(property) = self.invoker.element_events(trigger.id_path().as_str()) else {
            return Ok(Vec::new());
        };
        property
            .all_listeners(trigger.event())
            .map(|bound| self.bound_listener(bound))
            .collect()
    }

    fn bound_listener(&self, bound: &EventBoundListener) -> Result<PendingListener, ComponentError> {
        Ok(PendingListener {
            method: bound.method().to_string(),
            listener: self.lookup_listener(bound.method())?,
            validate_form: bound.form_id().is_some() && bound.is_validate_form(),
        })
    }

    /// Triggers the [`Direct`](crate::Direct) component at `id_path`.
    ///
    /// # Errors
    ///
    /// [`ComponentError::NotFound`], [`ComponentError::MissingCapability`]
    /// or the component's own failure.
    pub fn trigger(&mut self, id_path: &IdPath, cycle: &mut dyn Cycle) -> Result<(), ComponentError> {
        let id = self.find(id_path).ok_or_else(|| ComponentError::NotFound {
            page: self.name.clone(),
            path: id_path.to_string(),
        })?;
        if id == NodeId::ROOT {
            return Err(ComponentError::MissingCapability {
                path: id_path.to_string(),
                capability: "Direct",
            });
        }

        tracing::debug!(page = %self.name, component = %id_path, "triggering component");
        let mut component = self.take_component(id)?;
        let result = match component.as_direct() {
            Some(direct) => {
                let mut ctx = ComponentContext::new(self, cycle, id);
                direct.trigger(&mut ctx)
            }
            None => Err(ComponentError::MissingCapability {
                path: id_path.to_string(),
                capability: "Direct",
            }),
        };
        self.nodes[id.0].component = Some(component);
        result
    }

    /// Runs the listener method registered as `method`.
    ///
    /// # Errors
    ///
    /// [`ComponentError::UnknownListener`] or the listener's failure.
    pub fn invoke_listener(&mut self, method: &str, cycle: &mut dyn Cycle) -> Result<(), ComponentError> {
        let listener = self.lookup_listener(method)?;
        self.run_listener(method, &listener, cycle)
    }

    /// Runs `f` with a listener context over this page.
    ///
    /// Used for page-level hooks that are not registered listeners.
    pub fn with_context<R>(
        &mut self,
        cycle: &mut dyn Cycle,
        f: impl FnOnce(&mut ListenerContext<'_>) -> R,
    ) -> R {
        let mut ctx = ListenerContext::new(&self.name, &mut self.properties, cycle);
        f(&mut ctx)
    }

    fn lookup_listener(&self, method: &str) -> Result<Listener, ComponentError> {
        self.listeners
            .get(method)
            .cloned()
            .ok_or_else(|| ComponentError::UnknownListener {
                page: self.name.clone(),
                method: method.to_string(),
            })
    }

    fn run_listener(
        &mut self,
        method: &str,
        listener: &Listener,
        cycle: &mut dyn Cycle,
    ) -> Result<(), ComponentError> {
        tracing::debug!(page = %self.name, method, "invoking listener");
        let mut ctx = ListenerContext::new(&self.name, &mut self.properties, cycle);
        listener(&mut ctx)
    }

    /// Resets per-request state: properties, the rewinding flag and each
    /// component's own state.
    pub fn detach(&mut self) {
        self.properties = self.defaults.clone();
        self.rewinding = false;
        for node in &mut self.nodes {
            if let Some(component) = node.component.as_mut() {
                component.detach();
            }
        }
    }

    /// Nodes whose full path or local id is `target`, root excluded.
    fn matching_nodes<'a>(&'a self, target: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.nodes
            .iter()
            .enumerate()
            .skip(1)
            .filter(move |(_, node)| {
                node.id_path.as_str() == target || node.id_path.leaf() == Some(target)
            })
            .map(|(index, _)| NodeId(index))
    }

    /// Fails unless some component matching `form` is a form.
    fn check_form(&mut self, form: &str) -> Result<(), ComponentError> {
        let matches: Vec<NodeId> = self.matching_nodes(form).collect();
        if matches.is_empty() {
            return Err(ComponentError::NotFound {
                page: self.name.clone(),
                path: form.to_string(),
            });
        }
        let is_form = matches.into_iter().any(|id| {
            self.nodes[id.0]
                .component
                .as_deref_mut()
                .is_some_and(|component| component.as_form().is_some())
        });
        if is_form {
            Ok(())
        } else {
            Err(ComponentError::MissingCapability {
                path: form.to_string(),
                capability: "Form",
            })
        }
    }

    fn take_component(&mut self, id: NodeId) -> Result<Box<dyn Component>, ComponentError> {
        let node = &mut self.nodes[id.0];
        node.component
            .take()
            .ok_or_else(|| ComponentError::Busy(node.id_path.to_string()))
    }
}

/// Assembles a [`Page`].
///
/// # Example
///
/// ```
/// use tessera_component::builtin::{Insert, TextField};
/// use tessera_component::PageBuilder;
/// use tessera_event::ListenerDeclaration;
/// use serde_json::json;
///
/// let mut builder = PageBuilder::new("Profile");
/// let root = builder.root();
/// builder.add(root, "greeting", Insert::property("name")).unwrap();
/// builder.add(root, "email", TextField::new("email")).unwrap();
/// builder.property("name", json!("Ada"));
/// builder.listener("onEmailClick", |ctx| {
///     ctx.set_property("clicked", json!(true));
///     Ok(())
/// });
/// builder.declare(
///     ListenerDeclaration::new("onEmailClick").target("email").event("onClick"),
/// );
///
/// let page = builder.build().unwrap();
/// assert_eq!(page.component_count(), 2);
/// ```
pub struct PageBuilder {
    page: Page,
    declarations: Vec<ListenerDeclaration>,
}

impl PageBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            page: Page {
                name: name.into(),
                nodes: vec![Node::root()],
                properties: Properties::new(),
                defaults: Properties::new(),
                listeners: HashMap::new(),
                invoker: ComponentEventInvoker::new(),
                rewinding: false,
            },
            declarations: Vec::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Adds `component` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// [`ComponentError::InvalidId`] or [`ComponentError::DuplicateId`].
    pub fn add<C: Component + 'static>(
        &mut self,
        parent: NodeId,
        id: &str,
        component: C,
    ) -> Result<NodeId, ComponentError> {
        self.add_boxed(parent, id, Box::new(component))
    }

    /// Boxed form of [`add`](Self::add).
    ///
    /// # Errors
    ///
    /// As [`add`](Self::add), plus [`ComponentError::NotFound`] for a
    /// parent id from another builder.
    pub fn add_boxed(
        &mut self,
        parent: NodeId,
        id: &str,
        component: Box<dyn Component>,
    ) -> Result<NodeId, ComponentError> {
        let page = &mut self.page;
        let parent_node = page.nodes.get(parent.0).ok_or_else(|| ComponentError::NotFound {
            page: page.name.clone(),
            path: format!("#{}", parent.0),
        })?;
        let id_path = parent_node
            .id_path
            .child(id)
            .map_err(|_| ComponentError::InvalidId(id.to_string()))?;
        if page.nodes.iter().any(|node| node.id_path == id_path) {
            return Err(ComponentError::DuplicateId {
                page: page.name.clone(),
                parent: parent_node.id_path.to_string(),
                id: id.to_string(),
            });
        }

        let node_id = NodeId(page.nodes.len());
        page.nodes.push(Node {
            id_path,
            children: Vec::new(),
            type_name: component.type_name(),
            component: Some(component),
            listeners: Vec::new(),
        });
        page.nodes[parent.0].children.push(node_id);
        Ok(node_id)
    }

    /// Sets a property and its per-request default.
    pub fn property(&mut self, name: &str, value: Value) -> &mut Self {
        self.page.defaults.insert(name.to_string(), value.clone());
        self.page.properties.insert(name.to_string(), value);
        self
    }

    /// Registers a listener method.
    pub fn listener<F>(&mut self, method: &str, listener: F) -> &mut Self
    where
        F: Fn(&mut ListenerContext<'_>) -> Result<(), ComponentError> + Send + Sync + 'static,
    {
        self.page.listeners.insert(method.to_string(), Arc::new(listener));
        self
    }

    /// Binds a listener directly to one node's event.
    ///
    /// # Errors
    ///
    /// [`ComponentError::NotFound`] for an unknown node.
    pub fn on<F>(&mut self, node: NodeId, event: &str, listener: F) -> Result<&mut Self, ComponentError>
    where
        F: Fn(&mut ListenerContext<'_>) -> Result<(), ComponentError> + Send + Sync + 'static,
    {
        let page_name = self.page.name.clone();
        let slot = self
            .page
            .nodes
            .get_mut(node.0)
            .ok_or_else(|| ComponentError::NotFound {
                page: page_name,
                path: format!("#{}", node.0),
            })?;
        slot.listeners.push((event.to_string(), Arc::new(listener)));
        Ok(self)
    }

    /// Queues a listener declaration, checked by [`build`](Self::build).
    pub fn declare(&mut self, declaration: ListenerDeclaration) -> &mut Self {
        self.declarations.push(declaration);
        self
    }

    /// Connects declarations and returns the page.
    ///
    /// # Errors
    ///
    /// - [`ComponentError::UnknownListener`] for a declaration whose method
    ///   is not registered
    /// - [`EventError::NoTargets`] (wrapped) for a declaration without
    ///   targets or whose component targets match no node
    pub fn build(self) -> Result<Page, ComponentError> {
        let Self {
            mut page,
            declarations,
        } = self;

        for declaration in &declarations {
            if !page.listeners.contains_key(declaration.method()) {
                return Err(ComponentError::UnknownListener {
                    page: page.name.clone(),
                    method: declaration.method().to_string(),
                });
            }
            let unmatched = declaration
                .targets()
                .iter()
                .any(|target| page.matching_nodes(target).next().is_none());
            declaration.connect(&mut page.invoker)?;
            if unmatched {
                return Err(EventError::NoTargets {
                    method: declaration.method().to_string(),
                }
                .into());
            }
            if let Some(form) = declaration.form() {
                page.check_form(form)?;
            }
        }

        tracing::debug!(
            page = %page.name,
            components = page.component_count(),
            listeners = page.listeners.len(),
            "page built"
        );
        Ok(page)
    }
}
