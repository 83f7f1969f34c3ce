//! Guestbook demo application.
//!
//! Small enough to read in one sitting, but it touches every service:
//!
//! | Page | Reached through | Shows |
//! |------|-----------------|-------|
//! | `Home` | `home`, `page`, `direct` | sign-in form, locale switch, links |
//! | `Account` | `page` (established session only) | the signed name |
//! | `Catalog` | `external` | a declaratively built page |

use serde_json::json;
use std::sync::Arc;
use tessera_component::builtin::{Any, Binding, DirectLink, Form, Insert, PageLink, TextField};
use tessera_component::ComponentError;
use tessera_runtime::config::TesseraConfig;
use tessera_runtime::{
    ApplicationSpecification, ComponentSpecification, Engine, EngineBuilder, ExceptionReporter,
    PageDefinition, PageSpecification,
};
use tessera_types::Locale;
use tracing::debug;

use crate::AppError;

/// Name the demo application registers under.
pub const DEMO_NAME: &str = "guestbook";

/// The guestbook pages.
#[must_use]
pub fn demo_application() -> ApplicationSpecification {
    ApplicationSpecification::new(DEMO_NAME)
        .page("Home", home_page())
        .page("Account", account_page())
        .page("Catalog", catalog_page())
}

/// Builds an engine serving [`demo_application`].
///
/// # Errors
///
/// [`AppError::Engine`] if the configuration names a missing home page.
pub fn demo_engine(
    config: TesseraConfig,
    reporter: Option<Arc<dyn ExceptionReporter>>,
) -> Result<Engine, AppError> {
    let mut builder = EngineBuilder::new(demo_application()).config(config);
    if let Some(reporter) = reporter {
        builder = builder.reporter(reporter);
    }
    Ok(builder.build()?)
}

fn greeting(locale: &Locale, name: &str) -> String {
    match locale.language() {
        "fr" => format!("Bonjour, {name}!"),
        "de" => format!("Hallo, {name}!"),
        _ => format!("Hello, {name}!"),
    }
}

fn home_page() -> PageDefinition {
    PageDefinition::new(|builder| {
        let root = builder.root();
        builder.property("greeting", json!("Please sign the guestbook."));

        let heading = builder.add(root, "heading", Any::new("h1"))?;
        builder.add(heading, "greeting", Insert::property("greeting"))?;

        let form = builder.add(root, "sign", Form::new().listener("sign"))?;
        builder.add(form, "name", TextField::new("name").required())?;

        let french = builder.add(
            root,
            "french",
            DirectLink::new("switchLocale")
                .parameter(Binding::literal("fr"))
                .stateless(),
        )?;
        builder.add(french, "label", Insert::literal("Français"))?;

        let account = builder.add(root, "account", PageLink::new("Account"))?;
        builder.add(account, "label", Insert::literal("Your account"))?;
        Ok(())
    })
    .listener("sign", |ctx| {
        if ctx.cycle().validation().has_errors() {
            return Ok(());
        }
        let name = ctx.property_text("name").unwrap_or_default();
        let text = greeting(ctx.cycle().locale(), &name);
        debug!(name = %name, "guestbook signed");
        ctx.set_property("greeting", json!(text));
        Ok(())
    })
    .listener("switchLocale", |ctx| {
        let requested = ctx
            .cycle()
            .service_parameters()
            .first()
            .cloned()
            .ok_or_else(|| ComponentError::listener("switchLocale", "no locale given"))?;
        let locale = Locale::parse(&requested)
            .map_err(|e| ComponentError::listener("switchLocale", e.to_string()))?;
        ctx.cycle().set_locale(locale);
        Ok(())
    })
}

fn account_page() -> PageDefinition {
    PageDefinition::new(|builder| {
        let root = builder.root();
        let panel = builder.add(root, "panel", Any::new("div").attribute("class", Binding::literal("account")))?;
        builder.add(panel, "title", Insert::literal("Your account"))?;
        let home = builder.add(root, "home", PageLink::new("Home"))?;
        builder.add(home, "label", Insert::literal("Back"))?;
        Ok(())
    })
    .stateful()
}

fn catalog_page() -> PageDefinition {
    let specification = PageSpecification::new()
        .property("category", json!("everything"))
        .component(
            ComponentSpecification::new("heading", "Any", json!({ "element": "h2" })).child(
                ComponentSpecification::new(
                    "category",
                    "Insert",
                    json!({ "value": { "property": "category" } }),
                ),
            ),
        )
        .component(
            ComponentSpecification::new("home", "PageLink", json!({ "page": "Home" })).child(
                ComponentSpecification::new("label", "Insert", json!({ "value": { "literal": "Home" } })),
            ),
        );

    PageDefinition::declared(specification).external(|ctx, parameters| {
        if let Some(category) = parameters.first() {
            ctx.set_property("category", json!(category));
        }
        Ok(())
    })
}
