//! Component layer for Tessera.
//!
//! A page is a tree of components. Components render markup, re-derive
//! state from submitted forms while the page is rewound and, when they can
//! be addressed by a direct link, run page listeners when triggered.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  tessera-types     : IdPath, Link, Locale, ErrorCode     │
//! │  tessera-markup    : MarkupWrite, NestedWriter           │
//! │  tessera-event     : ListenerDeclaration, Trigger        │
//! │  tessera-component : Component, Page, Cycle   ◄── HERE   │
//! ├──────────────────────────────────────────────────────────┤
//! │  tessera-runtime   : Engine, RequestCycle, services      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Core Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Component`] | a node: `render`, `rewind`, `detach` |
//! | [`Direct`] / [`FormComponent`] | capabilities exposed through `as_direct` / `as_form` |
//! | [`Page`] / [`PageBuilder`] | the component arena, its properties and listener methods |
//! | [`ComponentContext`] | what a component sees while it runs |
//! | [`Cycle`] | the request cycle, implemented by the runtime |
//! | [`ValidationDelegate`] | per-request field errors |
//!
//! Built-in components live in [`builtin`]; [`testing`] drives pages
//! without an engine.

pub mod builtin;
mod component;
mod context;
mod cycle;
mod error;
mod page;
pub mod testing;
mod validation;

pub use component::{value_text, Component, Direct, FormComponent, Listener, ListenerContext, Properties};
pub use context::ComponentContext;
pub use cycle::{direct_context, ComponentAddress, Cycle, STATEFUL_OFF, STATEFUL_ON};
pub use error::ComponentError;
pub use page::{NodeId, Page, PageBuilder};
pub use validation::{FieldError, ValidationDelegate, ERROR_CLASS};

#[cfg(test)]
mod tests {
    use super::builtin::{
        Any, Binding, Block, ButtonLink, DirectLink, Form, Insert, PageLink, RenderBlock, TextField,
    };
    use super::testing::{MockCycle, PageTestHarness};
    use super::*;
    use serde_json::{json, Value};
    use tessera_event::ListenerDeclaration;
    use tessera_types::ErrorCode;

    fn count(ctx: &mut ListenerContext<'_>, name: &str) {
        let next = ctx.property(name).and_then(Value::as_i64).unwrap_or(0) + 1;
        ctx.set_property(name, json!(next));
    }

    fn push(ctx: &mut ListenerContext<'_>, name: &str, entry: &str) {
        let mut entries = match ctx.property(name) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        entries.push(json!(entry));
        ctx.set_property(name, Value::Array(entries));
    }

    fn signup_page() -> Page {
        let mut builder = PageBuilder::new("Signup");
        let root = builder.root();
        let form = builder
            .add(root, "form", Form::new().listener("save"))
            .expect("form");
        builder
            .add(form, "email", TextField::new("email").required())
            .expect("email");
        builder.listener("save", |ctx| {
            count(ctx, "saves");
            Ok(())
        });
        builder.listener("onEmailClick", |ctx| {
            count(ctx, "clicks");
            Ok(())
        });
        builder.declare(
            ListenerDeclaration::new("onEmailClick")
                .target("email")
                .event("onClick"),
        );
        builder.build().expect("page")
    }

    #[test]
    fn renders_nested_components() {
        let mut builder = PageBuilder::new("Home");
        let root = builder.root();
        let boxed = builder
            .add(root, "box", Any::new("div").attribute("class", Binding::literal("box")))
            .expect("box");
        builder
            .add(boxed, "greeting", Insert::property("name"))
            .expect("greeting");
        let logout = builder
            .add(root, "logout", DirectLink::new("logout"))
            .expect("logout");
        builder
            .add(logout, "label", Insert::literal("Log out"))
            .expect("label");
        builder.property("name", json!("Ada & Bob"));
        builder.listener("logout", |_| Ok(()));

        let mut harness = PageTestHarness::new(builder.build().expect("page"));
        let html = harness.render().expect("render");
        assert_eq!(
            html,
            r#"<div class="box">Ada &amp; Bob</div><a href="/app/direct/0/Home/logout">Log out</a>"#
        );
    }

    #[test]
    fn any_attribute_kinds() {
        let mut builder = PageBuilder::new("Home");
        let root = builder.root();
        builder
            .add(
                root,
                "field",
                Any::new("input")
                    .attribute("checked", Binding::literal(true))
                    .attribute("hidden", Binding::literal(false))
                    .attribute("size", Binding::literal(20))
                    .attribute("title", Binding::property("missing")),
            )
            .expect("field");
        let mut harness = PageTestHarness::new(builder.build().expect("page"));
        assert_eq!(
            harness.render().expect("render"),
            r#"<input checked size="20"></input>"#
        );
    }

    #[test]
    fn raw_insert_skips_escaping() {
        let mut builder = PageBuilder::new("Home");
        let root = builder.root();
        builder
            .add(root, "markup", Insert::literal("<b>bold</b>").raw())
            .expect("markup");
        let mut harness = PageTestHarness::new(builder.build().expect("page"));
        assert_eq!(harness.render().expect("render"), "<b>bold</b>");
    }

    #[test]
    fn email_click_listener_fires_exactly_once() {
        let mut harness = PageTestHarness::new(signup_page());
        harness.rewind("form.email", "onClick").expect("rewind");
        assert_eq!(harness.page().property("clicks"), Some(&json!(1)));
        assert_eq!(harness.page().property("saves"), None);
    }

    #[test]
    fn other_events_fire_nothing() {
        let mut harness = PageTestHarness::new(signup_page());
        harness.rewind("form.email", "onBlur").expect("rewind");
        assert_eq!(harness.page().property("clicks"), None);
    }

    #[test]
    fn unknown_trigger_reports_no_targets() {
        let mut harness = PageTestHarness::new(signup_page());
        let err = harness
            .rewind("form.phone", "onClick")
            .expect_err("missing trigger");
        assert_eq!(err.code(), "COMPONENT_EVENT");
        assert!(err.to_string().contains("No targets found"));
        assert!(!harness.page().is_rewinding());
    }

    #[test]
    fn declaration_without_targets_is_rejected() {
        let mut builder = PageBuilder::new("Home");
        builder.listener("orphan", |_| Ok(()));
        builder.declare(ListenerDeclaration::new("orphan").event("onClick"));
        let err = builder.build().expect_err("no targets");
        assert!(err.to_string().contains("No targets found"));
    }

    #[test]
    fn declaration_for_absent_component_is_rejected() {
        let mut builder = PageBuilder::new("Home");
        builder.listener("orphan", |_| Ok(()));
        builder.declare(
            ListenerDeclaration::new("orphan")
                .target("ghost")
                .event("onClick"),
        );
        let err = builder.build().expect_err("unmatched target");
        assert!(err.to_string().contains("No targets found"));
    }

    #[test]
    fn declaration_for_unknown_method_is_rejected() {
        let mut builder = PageBuilder::new("Home");
        builder
            .add(builder.root(), "email", TextField::new("email"))
            .expect("email");
        builder.declare(ListenerDeclaration::new("nope").target("email").event("onClick"));
        let err = builder.build().expect_err("unknown method");
        assert_eq!(err.code(), "COMPONENT_UNKNOWN_LISTENER");
    }

    #[test]
    fn listeners_fire_in_tree_order() {
        let mut builder = PageBuilder::new("Home");
        let root = builder.root();
        let first = builder.add(root, "first", Form::new()).expect("first");
        let first_email = builder
            .add(first, "email", TextField::new("a"))
            .expect("first email");
        let second = builder.add(root, "second", Form::new()).expect("second");
        let second_email = builder
            .add(second, "email", TextField::new("b"))
            .expect("second email");

        builder
            .on(second_email, "onClick", |ctx| {
                push(ctx, "order", "second");
                Ok(())
            })
            .expect("bind second");
        builder
            .on(first_email, "onClick", |ctx| {
                push(ctx, "order", "first");
                Ok(())
            })
            .expect("bind first");

        let mut harness = PageTestHarness::new(builder.build().expect("page"));
        harness.rewind("email", "onClick").expect("rewind");
        assert_eq!(
            harness.page().property("order"),
            Some(&json!(["first", "second"]))
        );
    }

    #[test]
    fn submit_parses_fields_before_listener() {
        let mut harness = PageTestHarness::new(signup_page());
        let html = harness
            .submit("form", &[("form.email", "ada@example.com")])
            .expect("submit");
        assert_eq!(harness.page().property("email"), Some(&json!("ada@example.com")));
        assert_eq!(harness.page().property("saves"), Some(&json!(1)));
        assert_eq!(
            html,
            concat!(
                r#"<form method="post" action="/app/direct/0/Signup/form" name="form">"#,
                r#"<input type="hidden" name="_trigger" value="form"/>"#,
                r#"<input type="hidden" name="_event" value="trigger"/>"#,
                r#"<input type="text" name="form.email" value="ada@example.com"/>"#,
                "</form>"
            )
        );
    }

    #[test]
    fn submission_names_field_event() {
        let mut harness = PageTestHarness::new(signup_page());
        harness
            .submit(
                "form",
                &[
                    ("form.email", "ada@example.com"),
                    ("_trigger", "form.email"),
                    ("_event", "onClick"),
                ],
            )
            .expect("submit");
        assert_eq!(harness.page().property("clicks"), Some(&json!(1)));
        assert_eq!(harness.page().property("saves"), Some(&json!(1)));
        assert_eq!(harness.page().property("email"), Some(&json!("ada@example.com")));
    }

    fn checked_page(validate: bool) -> Page {
        let mut builder = PageBuilder::new("Signup");
        let form = builder
            .add(builder.root(), "form", Form::new())
            .expect("form");
        builder
            .add(form, "email", TextField::new("email").required())
            .expect("email");
        builder.listener("check", |ctx| {
            let email = ctx.property_text("email").unwrap_or_default();
            ctx.set_property("checked", json!(email));
            Ok(())
        });
        builder.listener("ping", |ctx| {
            count(ctx, "pings");
            Ok(())
        });
        builder.declare(
            ListenerDeclaration::new("check")
                .target("email")
                .event("onBlur")
                .submit_form("form")
                .validate_form(validate),
        );
        builder.declare(
            ListenerDeclaration::new("ping")
                .element("status")
                .event("onClick"),
        );
        builder.build().expect("page")
    }

    #[test]
    fn form_listener_sees_rewound_fields() {
        let mut harness = PageTestHarness::new(checked_page(true));
        harness.cycle_mut().add_parameter("form.email", "ada@example.com");
        harness.rewind("form.email", "onBlur").expect("rewind");
        assert_eq!(harness.page().property("checked"), Some(&json!("ada@example.com")));
    }

    #[test]
    fn validated_form_listener_skipped_on_errors() {
        let mut harness = PageTestHarness::new(checked_page(true));
        harness.cycle_mut().add_parameter("form.email", " ");
        harness.rewind("form.email", "onBlur").expect("rewind");
        assert!(harness.cycle().validation().has_errors());
        assert_eq!(harness.page().property("checked"), None);

        let mut unvalidated = PageTestHarness::new(checked_page(false));
        unvalidated.cycle_mut().add_parameter("form.email", " ");
        unvalidated.rewind("form.email", "onBlur").expect("rewind");
        assert_eq!(unvalidated.page().property("checked"), Some(&json!("")));
    }

    #[test]
    fn element_trigger_fires_element_listener() {
        let mut harness = PageTestHarness::new(checked_page(false));
        harness.rewind("status", "onClick").expect("rewind");
        assert_eq!(harness.page().property("pings"), Some(&json!(1)));

        let err = harness.rewind("status", "onBlur").expect_err("no listener");
        assert_eq!(err.code(), "COMPONENT_EVENT");
    }

    #[test]
    fn submitted_form_must_be_a_form() {
        let declare = |form: &str| {
            let mut builder = PageBuilder::new("Signup");
            let root = builder.root();
            builder.add(root, "form", Form::new()).expect("form");
            builder.add(root, "email", TextField::new("email")).expect("email");
            builder.listener("check", |_| Ok(()));
            builder.declare(
                ListenerDeclaration::new("check")
                    .target("email")
                    .event("onBlur")
                    .submit_form(form),
            );
            builder.build()
        };

        assert!(declare("form").is_ok());
        let err = declare("email").expect_err("not a form");
        assert_eq!(err.code(), "COMPONENT_MISSING_CAPABILITY");
        let err = declare("nowhere").expect_err("absent");
        assert_eq!(err.code(), "COMPONENT_NOT_FOUND");
    }

    #[test]
    fn required_field_redisplays_with_error() {
        let mut harness = PageTestHarness::new(signup_page());
        let html = harness
            .submit("form", &[("form.email", "  ")])
            .expect("submit");
        assert!(harness.cycle().validation().is_in_error("form.email"));
        assert_eq!(harness.page().property("email"), None);
        assert!(html.contains(r#"value="  " class="tessera-error"/>"#));
        assert!(html.contains(r#"<span class="tessera-error">is required</span>"#));
    }

    #[test]
    fn trigger_requires_direct_capability() {
        let mut harness = PageTestHarness::new(signup_page());
        let err = harness.trigger("form.email").expect_err("not direct");
        assert_eq!(err.code(), "COMPONENT_MISSING_CAPABILITY");

        let err = harness.trigger("form.gone").expect_err("absent");
        assert_eq!(err.code(), "COMPONENT_NOT_FOUND");
        assert!(err.is_recoverable());
    }

    #[test]
    fn direct_link_trigger_sees_service_parameters() {
        let mut builder = PageBuilder::new("Home");
        builder
            .add(builder.root(), "pick", DirectLink::new("pick").parameter(Binding::literal(42)))
            .expect("pick");
        builder.listener("pick", |ctx| {
            let picked = ctx.cycle().service_parameters().first().cloned();
            ctx.set_property("picked", json!(picked));
            Ok(())
        });
        let mut harness = PageTestHarness::new(builder.build().expect("page"));
        let html = harness.render().expect("render");
        assert_eq!(html, r#"<a href="/app/direct/0/Home/pick?sp=42"></a>"#);

        harness.cycle_mut().set_service_parameters(vec!["42".into()]);
        harness.trigger("pick").expect("trigger");
        assert_eq!(harness.page().property("picked"), Some(&json!("42")));
    }

    #[test]
    fn links_may_not_nest() {
        let mut builder = PageBuilder::new("Home");
        let outer = builder
            .add(builder.root(), "outer", PageLink::new("Help"))
            .expect("outer");
        builder
            .add(outer, "inner", DirectLink::new("go"))
            .expect("inner");
        builder.listener("go", |_| Ok(()));
        let mut harness = PageTestHarness::new(builder.build().expect("page"));
        let err = harness.render().expect_err("nested");
        assert_eq!(err.code(), "COMPONENT_NESTED_LINK");
        assert!(harness
            .cycle()
            .attribute(builtin::LINK_COMPONENT_ATTRIBUTE)
            .is_none());
    }

    #[test]
    fn disabled_link_renders_body_only() {
        let mut builder = PageBuilder::new("Home");
        let link = builder
            .add(builder.root(), "help", PageLink::new("Help").disabled())
            .expect("help");
        builder
            .add(link, "label", Insert::literal("Help"))
            .expect("label");
        let mut harness = PageTestHarness::new(builder.build().expect("page"));
        assert_eq!(harness.render().expect("render"), "Help");
    }

    #[test]
    fn button_link_navigates_by_script() {
        let mut builder = PageBuilder::new("Home");
        let button = builder
            .add(builder.root(), "help", ButtonLink::new("Help"))
            .expect("help");
        builder
            .add(button, "label", Insert::literal("Help"))
            .expect("label");
        let mut harness = PageTestHarness::new(builder.build().expect("page"));
        assert_eq!(
            harness.render().expect("render"),
            r#"<button type="button" onclick="window.location='/app/page/Help'">Help</button>"#
        );
    }

    fn library_page() -> Page {
        let mut builder = PageBuilder::new("Library");
        let root = builder.root();
        let actions = builder.add(root, "actions", Block::new()).expect("block");
        builder
            .add(actions, "likes", Insert::property("likes"))
            .expect("likes");
        let like = builder
            .add(actions, "like", DirectLink::new("like"))
            .expect("like");
        builder
            .add(like, "label", Insert::literal("Like"))
            .expect("label");
        builder.add(root, "title", Insert::literal("Library")).expect("title");
        builder.property("likes", json!(3));
        builder.listener("like", |ctx| {
            count(ctx, "likes");
            Ok(())
        });
        builder.build().expect("library")
    }

    #[test]
    fn block_renders_only_where_requested() {
        let mut builder = PageBuilder::new("Home");
        let root = builder.root();
        let help = builder.add(root, "help", Block::new()).expect("block");
        builder
            .add(help, "text", Insert::literal("Ask us"))
            .expect("text");
        builder.add(root, "intro", Insert::literal("Hi. ")).expect("intro");
        builder
            .add(root, "show", RenderBlock::new("help"))
            .expect("show");

        let mut harness = PageTestHarness::new(builder.build().expect("page"));
        assert_eq!(harness.render().expect("render"), "Hi. Ask us");
    }

    #[test]
    fn block_from_other_page_links_back_through_both_pages() {
        let mut builder = PageBuilder::new("Shelf");
        builder
            .add(builder.root(), "shared", RenderBlock::from_page("Library", "actions"))
            .expect("shared");
        let mut cycle = MockCycle::new("Shelf");
        cycle.add_page(library_page());

        let mut harness = PageTestHarness::with_cycle(builder.build().expect("shelf"), cycle);
        let html = harness.render().expect("render");
        assert_eq!(
            html,
            r#"3<a href="/app/direct/0/Shelf/Library/actions.like">Like</a>"#
        );
        assert!(harness.cycle().other_page("Library").is_some());
    }

    fn render_error(component: RenderBlock) -> &'static str {
        let mut builder = PageBuilder::new("Shelf");
        builder
            .add(builder.root(), "show", component)
            .expect("show");
        let mut cycle = MockCycle::new("Shelf");
        cycle.add_page(library_page());
        PageTestHarness::with_cycle(builder.build().expect("shelf"), cycle)
            .render()
            .expect_err("render fails")
            .code()
    }

    #[test]
    fn render_block_failures() {
        assert_eq!(
            render_error(RenderBlock::from_page("Library", "title")),
            "COMPONENT_MISSING_CAPABILITY"
        );
        assert_eq!(
            render_error(RenderBlock::from_page("Library", "gone")),
            "COMPONENT_NOT_FOUND"
        );
        assert_eq!(
            render_error(RenderBlock::from_page("Attic", "actions")),
            "COMPONENT_PAGE_UNAVAILABLE"
        );
        assert_eq!(render_error(RenderBlock::new("a..b")), "COMPONENT_INVALID_ID");
    }

    #[test]
    fn block_may_not_render_itself() {
        let mut builder = PageBuilder::new("Shelf");
        let root = builder.root();
        let looped = builder.add(root, "looped", Block::new()).expect("looped");
        builder
            .add(looped, "again", RenderBlock::new("looped"))
            .expect("again");
        builder
            .add(root, "show", RenderBlock::new("looped"))
            .expect("show");

        let mut harness = PageTestHarness::new(builder.build().expect("shelf"));
        let err = harness.render().expect_err("recursive block");
        assert_eq!(err.code(), "COMPONENT_BUSY");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut builder = PageBuilder::new("Home");
        let root = builder.root();
        builder.add(root, "a", Insert::literal("x")).expect("first");
        let err = builder
            .add(root, "a", Insert::literal("y"))
            .expect_err("duplicate");
        assert_eq!(err.code(), "COMPONENT_DUPLICATE_ID");

        let err = builder
            .add(root, "a.b", Insert::literal("z"))
            .expect_err("invalid");
        assert_eq!(err.code(), "COMPONENT_INVALID_ID");
    }

    #[test]
    fn detach_restores_defaults() {
        let mut harness = PageTestHarness::new(signup_page());
        harness
            .submit("form", &[("form.email", "ada@example.com")])
            .expect("submit");
        harness.detach();
        assert_eq!(harness.page().property("email"), None);
        assert_eq!(harness.page().property("saves"), None);
    }

    #[test]
    fn pre_order_visits_parents_first() {
        let page = signup_page();
        let paths: Vec<String> = page
            .pre_order()
            .into_iter()
            .map(|id| page.node_path(id).to_string())
            .collect();
        assert_eq!(paths, vec!["", "form", "form.email"]);
    }
}
