//! Integration tests driving the engine through its services.
//!
//! Every test sends [`WebRequest`]s through [`Engine::service`] and checks
//! the rendered response, the exception reports and the page pool.

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tessera_component::builtin::{
    Binding, Block, DirectLink, Form, Insert, RenderBlock, TextField,
};
use tessera_component::{ComponentError, Cycle};
use tessera_event::ListenerDeclaration;
use tessera_runtime::config::{EngineConfig, MultipartConfig, TesseraConfig};
use tessera_runtime::{
    ApplicationSpecification, Engine, EngineBuilder, FileContent, MemoryReporter, MultipartBody,
    PageDefinition, RawPart, SessionState, WebRequest, WebResponse,
};
use tessera_types::Locale;

// =============================================================================
// Fixture
// =============================================================================

struct Fixture {
    engine: Engine,
    reporter: Arc<MemoryReporter>,
    home_builds: Arc<AtomicUsize>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_config(TesseraConfig::default())
    }

    fn with_config(config: TesseraConfig) -> Self {
        let home_builds = Arc::new(AtomicUsize::new(0));
        let reporter = Arc::new(MemoryReporter::new());
        let engine = EngineBuilder::new(application(Arc::clone(&home_builds)))
            .config(config)
            .reporter(reporter.clone())
            .build()
            .expect("engine builds");
        Self {
            engine,
            reporter,
            home_builds,
        }
    }

    fn get(&self, url: &str) -> WebResponse {
        self.send(WebRequest::from_url(url).expect("valid url"))
    }

    fn send(&self, request: WebRequest) -> WebResponse {
        self.engine.service(request).expect("no io failure")
    }
}

fn application(home_builds: Arc<AtomicUsize>) -> ApplicationSpecification {
    let home = PageDefinition::new(move |builder| {
        home_builds.fetch_add(1, Ordering::SeqCst);
        let root = builder.root();
        builder.add(root, "picked", Insert::property("picked"))?;
        builder.add(
            root,
            "pick",
            DirectLink::new("pick").parameter(Binding::literal(42)),
        )?;
        builder.add(root, "french", DirectLink::new("french").stateless())?;
        builder.add(root, "next", DirectLink::new("next").stateless())?;
        let form = builder.add(root, "form", Form::new().listener("save"))?;
        builder.add(form, "email", TextField::new("email").required())?;
        builder.add(root, "saved", Insert::property("saved"))?;
        builder.add(root, "clicked", Insert::property("clicked"))?;
        builder.add(root, "checked", Insert::property("checked"))?;
        builder.add(root, "plain", Insert::literal("not a link"))?;
        builder.declare(ListenerDeclaration::new("emailClicked").target("email").event("onClick"));
        builder.declare(
            ListenerDeclaration::new("emailChecked")
                .target("form.email")
                .event("onBlur")
                .submit_form("form")
                .validate_form(true),
        );
        Ok(())
    })
    .listener("emailClicked", |ctx| {
        let email = ctx.property_text("email").unwrap_or_default();
        ctx.set_property("clicked", json!(format!("clicked {email}")));
        Ok(())
    })
    .listener("emailChecked", |ctx| {
        let email = ctx.property_text("email").unwrap_or_default();
        ctx.set_property("checked", json!(format!("checked {email}")));
        Ok(())
    })
    .listener("pick", |ctx| {
        let picked = ctx.cycle().service_parameters().join(",");
        ctx.set_property("picked", json!(format!("picked {picked}")));
        Ok(())
    })
    .listener("french", |ctx| {
        ctx.cycle().set_locale(Locale::language_only("fr"));
        Ok(())
    })
    .listener("next", |ctx| {
        ctx.activate("Thanks");
        Ok(())
    })
    .listener("save", |ctx| {
        if ctx.cycle().validation().has_errors() {
            return Ok(());
        }
        let email = ctx.property_text("email").unwrap_or_default();
        ctx.set_property("saved", json!(format!("saved {email}")));
        Ok(())
    });

    let thanks = PageDefinition::new(|builder| {
        builder.add(builder.root(), "thanks", Insert::literal("Thank you"))?;
        Ok(())
    });

    let account = PageDefinition::new(|builder| {
        builder.add(builder.root(), "balance", Insert::literal("Balance"))?;
        Ok(())
    })
    .stateful();

    let catalog = PageDefinition::new(|builder| {
        builder.add(builder.root(), "category", Insert::property("category"))?;
        Ok(())
    })
    .external(|ctx, parameters| {
        let category = parameters
            .first()
            .ok_or_else(|| ComponentError::listener("external", "missing category"))?;
        ctx.set_property("category", json!(category));
        Ok(())
    });

    let library = PageDefinition::new(|builder| {
        let root = builder.root();
        let actions = builder.add(root, "actions", Block::new())?;
        builder.add(actions, "likes", Insert::property("likes"))?;
        builder.add(actions, "like", DirectLink::new("like").stateless())?;
        builder.add(root, "title", Insert::literal("Library"))?;
        builder.property("likes", json!(0));
        Ok(())
    })
    .listener("like", |ctx| {
        let likes = ctx.property("likes").and_then(serde_json::Value::as_i64).unwrap_or(0);
        ctx.set_property("likes", json!(likes + 1));
        Ok(())
    });

    let shelf = PageDefinition::new(|builder| {
        let root = builder.root();
        builder.add(root, "heading", Insert::literal("Shelf:"))?;
        builder.add(root, "shared", RenderBlock::from_page("Library", "actions"))?;
        Ok(())
    });

    ApplicationSpecification::new("shop")
        .page("Home", home)
        .page("Library", library)
        .page("Shelf", shelf)
        .page("Thanks", thanks)
        .page("Account", account)
        .page("Catalog", catalog)
}

// =============================================================================
// Page and Home Services
// =============================================================================

mod page_service {
    use super::*;

    #[test]
    fn bare_servlet_path_renders_home() {
        let fixture = Fixture::new();
        let response = fixture.get("/app");

        assert_eq!(response.status, 200);
        assert!(response.body.contains("not a link"));
        assert!(response
            .body
            .contains(r#"<a href="/app/direct/0/Home/pick?sp=42"></a>"#));
        assert!(response
            .body
            .contains(r#"<form method="post" action="/app/direct/0/Home/form" name="form">"#));
    }

    #[test]
    fn established_session_marks_links_stateful() {
        let fixture = Fixture::new();
        let response =
            fixture.send(WebRequest::new("/app/page/Home").with_session(SessionState::Established));
        assert!(response.body.contains("/app/direct/1/Home/pick?sp=42"));
    }

    #[test]
    fn unknown_page_is_configuration_error() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/page/Nowhere");

        assert_eq!(response.status, 500);
        assert!(response.body.contains("ENGINE_UNKNOWN_PAGE"));
        assert_eq!(fixture.reporter.codes(), vec!["ENGINE_UNKNOWN_PAGE"]);
    }

    #[test]
    fn page_arity_checked() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/page/Home/extra");
        assert_eq!(response.status, 500);
        assert_eq!(fixture.reporter.codes(), vec!["ENGINE_CONTEXT_ARITY"]);
    }

    #[test]
    fn unknown_service() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/teleport/Home");
        assert_eq!(response.status, 500);
        assert_eq!(fixture.reporter.codes(), vec!["ENGINE_UNKNOWN_SERVICE"]);
    }

    #[test]
    fn pages_are_pooled() {
        let fixture = Fixture::new();
        fixture.get("/app/page/Home");
        fixture.get("/app/page/Home");

        assert_eq!(fixture.home_builds.load(Ordering::SeqCst), 1);
        assert_eq!(fixture.engine.page_source().pool().idle_count("Home"), 1);
    }
}

// =============================================================================
// Direct Service
// =============================================================================

mod direct_service {
    use super::*;

    #[test]
    fn link_triggers_listener_with_parameters() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/0/Home/pick?sp=42&sp=7");

        assert_eq!(response.status, 200);
        assert!(response.body.contains("picked 42,7"));
        assert!(fixture.reporter.is_empty());
    }

    #[test]
    fn four_slot_context_accepted() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/0/Thanks/Home/pick?sp=1");

        assert_eq!(response.status, 200);
        assert!(response.body.contains("Thank you"));
        assert!(fixture.reporter.is_empty());
    }

    #[test]
    fn page_address_is_not_direct() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/0/Home/");

        assert_eq!(response.status, 500);
        assert!(response.body.contains("is not Direct"));
        assert_eq!(fixture.reporter.codes(), vec!["ENGINE_COMPONENT"]);
    }

    #[test]
    fn wrong_arity_rejected() {
        let fixture = Fixture::new();
        for url in ["/app/direct/0/Home", "/app/direct/0/Home/a/b/c"] {
            let response = fixture.get(url);
            assert_eq!(response.status, 500, "{url}");
        }
        assert_eq!(
            fixture.reporter.codes(),
            vec!["ENGINE_CONTEXT_ARITY", "ENGINE_CONTEXT_ARITY"]
        );
    }

    #[test]
    fn missing_component_is_stale_link() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/0/Home/vanished");

        assert_eq!(response.status, 200);
        assert!(response.body.contains("Stale Link"));
        assert!(response.body.contains("vanished"));
        assert!(fixture.reporter.is_empty());
    }

    #[test]
    fn component_without_direct_capability() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/0/Home/plain");

        assert_eq!(response.status, 500);
        assert_eq!(fixture.reporter.codes(), vec!["ENGINE_COMPONENT"]);
    }

    #[test]
    fn stateful_link_without_session_is_stale() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/1/Home/pick");

        assert_eq!(response.status, 200);
        assert!(response.body.contains("Stale Session"));

        let established = fixture.send(
            WebRequest::new("/app/direct/1/Home/pick").with_session(SessionState::Established),
        );
        assert!(established.body.contains("picked"));
    }

    #[test]
    fn stateless_component_never_stale() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/1/Home/next");
        assert!(response.body.contains("Thank you"));
    }

    #[test]
    fn stale_session_redirects_when_configured() {
        let fixture = Fixture::with_config(TesseraConfig {
            engine: EngineConfig {
                redirect_on_stale: true,
                ..EngineConfig::default()
            },
            ..TesseraConfig::default()
        });
        let response = fixture.get("/app/direct/1/Home/pick");

        assert_eq!(response.status, 302);
        assert_eq!(response.location.as_deref(), Some("/app/page/StaleSession"));
    }

    #[test]
    fn listener_can_activate_other_page() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/0/Home/next");

        assert!(response.body.contains("Thank you"));
        assert!(!response.body.contains("not a link"));
        assert_eq!(fixture.engine.page_source().pool().idle_count("Home"), 1);
        assert_eq!(fixture.engine.page_source().pool().idle_count("Thanks"), 1);
    }

    #[test]
    fn stateful_page_needs_session() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/page/Account");
        assert!(response.body.contains("Stale Session"));

        let established =
            fixture.send(WebRequest::new("/app/page/Account").with_session(SessionState::Established));
        assert!(established.body.contains("Balance"));
    }
}

// =============================================================================
// Form Submission
// =============================================================================

mod form_submission {
    use super::*;

    #[test]
    fn submitted_value_rewinds_and_saves() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/0/Home/form?form.email=ada%40example.com");

        assert_eq!(response.status, 200);
        assert!(response.body.contains(r#"value="ada@example.com""#));
        assert!(response.body.contains("saved ada@example.com"));
    }

    #[test]
    fn form_renders_trigger_fields() {
        let fixture = Fixture::new();
        let response = fixture.get("/app");
        assert!(response
            .body
            .contains(r#"<input type="hidden" name="_trigger" value="form"/>"#));
        assert!(response
            .body
            .contains(r#"<input type="hidden" name="_event" value="trigger"/>"#));
    }

    #[test]
    fn field_event_fires_declared_listener() {
        let fixture = Fixture::new();
        let response = fixture.get(
            "/app/direct/0/Home/form?form.email=ada%40example.com&_trigger=form.email&_event=onClick",
        );

        assert_eq!(response.status, 200);
        assert!(response.body.contains("clicked ada@example.com"));
        assert!(response.body.contains("saved ada@example.com"));
        assert!(fixture.reporter.is_empty());
    }

    #[test]
    fn plain_submission_skips_field_listeners() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/0/Home/form?form.email=ada%40example.com");

        assert!(response.body.contains("saved ada@example.com"));
        assert!(!response.body.contains("clicked"));
        assert!(!response.body.contains("checked"));
    }

    #[test]
    fn validated_form_listener_waits_for_valid_fields() {
        let fixture = Fixture::new();
        let invalid = fixture.get("/app/direct/0/Home/form?form.email=&_trigger=form.email&_event=onBlur");
        assert_eq!(invalid.status, 200);
        assert!(invalid.body.contains("is required"));
        assert!(!invalid.body.contains("checked"));

        let valid =
            fixture.get("/app/direct/0/Home/form?form.email=bea%40example.com&_trigger=form.email&_event=onBlur");
        assert!(valid.body.contains("checked bea@example.com"));
    }

    #[test]
    fn unknown_trigger_is_stale_link() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/0/Home/form?_trigger=form.gone&_event=onClick");

        assert_eq!(response.status, 200);
        assert!(response.body.contains("Stale Link"));
        assert!(response.body.contains("form.gone"));
        assert!(fixture.reporter.is_empty());
    }

    #[test]
    fn blank_required_field_redisplayed() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/0/Home/form?form.email=");

        assert_eq!(response.status, 200);
        assert!(response.body.contains("is required"));
        assert!(response.body.contains(r#"class="tessera-error""#));
        assert!(!response.body.contains("saved"));
    }

    #[test]
    fn multipart_fields_are_parameters() {
        let fixture = Fixture::new();
        let request = WebRequest::new("/app/direct/0/Home/form").with_multipart(MultipartBody {
            content_length: 64,
            items: vec![RawPart::Field {
                name: "form.email".into(),
                value: "bea@example.com".into(),
            }],
        });
        let response = fixture.send(request);
        assert!(response.body.contains("saved bea@example.com"));
    }

    #[test]
    fn oversized_multipart_rejected() {
        let fixture = Fixture::with_config(TesseraConfig {
            multipart: MultipartConfig {
                max_size: 10,
                ..MultipartConfig::default()
            },
            ..TesseraConfig::default()
        });
        let request = WebRequest::new("/app/direct/0/Home/form").with_multipart(MultipartBody {
            content_length: 11,
            items: Vec::new(),
        });

        let response = fixture.send(request);
        assert_eq!(response.status, 500);
        assert_eq!(fixture.reporter.codes(), vec!["ENGINE_PAYLOAD_TOO_LARGE"]);
    }

    #[test]
    fn uploads_deleted_after_request() {
        let repository = tempfile::TempDir::new().expect("temp dir");
        let fixture = Fixture::with_config(TesseraConfig {
            multipart: MultipartConfig {
                threshold_size: 4,
                repository: Some(repository.path().to_path_buf()),
                ..MultipartConfig::default()
            },
            ..TesseraConfig::default()
        });
        let request = WebRequest::new("/app/page/Home").with_multipart(MultipartBody {
            content_length: 64,
            items: vec![RawPart::File {
                name: "avatar".into(),
                file_path: "avatar.png".into(),
                content_type: "image/png".into(),
                content: FileContent::InMemory(vec![0_u8; 32]),
            }],
        });

        let response = fixture.send(request);
        assert_eq!(response.status, 200);
        let leftovers = std::fs::read_dir(repository.path()).expect("readable").count();
        assert_eq!(leftovers, 0);
    }
}

// =============================================================================
// External and Reset Services
// =============================================================================

mod external_and_reset {
    use super::*;

    #[test]
    fn external_hook_receives_parameters() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/external/Catalog?sp=books");

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "books");
    }

    #[test]
    fn hook_failure_reported() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/external/Catalog");

        assert_eq!(response.status, 500);
        assert!(response.body.contains("missing category"));
    }

    #[test]
    fn page_without_hook_is_not_external() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/external/Home");

        assert_eq!(response.status, 500);
        assert_eq!(fixture.reporter.codes(), vec!["ENGINE_NOT_EXTERNAL"]);
    }

    #[test]
    fn reset_disabled_by_default() {
        let fixture = Fixture::new();
        fixture.get("/app/page/Home");
        let response = fixture.get("/app/reset/Home");

        assert_eq!(response.status, 200);
        assert_eq!(fixture.home_builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reset_discards_pool_when_enabled() {
        let fixture = Fixture::with_config(TesseraConfig {
            engine: EngineConfig {
                reset_service_enabled: true,
                ..EngineConfig::default()
            },
            ..TesseraConfig::default()
        });
        fixture.get("/app/page/Home");
        let response = fixture.get("/app/reset/Home");

        assert_eq!(response.status, 200);
        assert_eq!(fixture.home_builds.load(Ordering::SeqCst), 2);
    }
}

// =============================================================================
// Blocks
// =============================================================================

mod blocks {
    use super::*;

    #[test]
    fn block_from_other_page_rendered_with_four_slot_link() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/page/Shelf");

        assert_eq!(response.status, 200);
        assert_eq!(
            response.body,
            r#"Shelf:0<a href="/app/direct/0/Shelf/Library/actions.like"></a>"#
        );
        assert_eq!(fixture.engine.page_source().pool().idle_count("Library"), 1);
    }

    #[test]
    fn following_block_link_triggers_block_page_and_renders_shelf() {
        let fixture = Fixture::new();
        let shelf = fixture.get("/app/page/Shelf");
        let start = shelf.body.find("/app/direct/").expect("direct link rendered");
        let end = start + shelf.body[start..].find('"').expect("closing quote");
        let href = &shelf.body[start..end];

        let response = fixture.get(href);
        assert_eq!(response.status, 200);
        assert_eq!(
            response.body,
            r#"Shelf:1<a href="/app/direct/0/Shelf/Library/actions.like"></a>"#
        );
        assert!(fixture.reporter.is_empty());
    }

    #[test]
    fn missing_block_page_reported() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/0/Shelf/Attic/actions.like");
        assert_eq!(response.status, 500);
        assert_eq!(fixture.reporter.codes(), vec!["ENGINE_UNKNOWN_PAGE"]);
    }
}

// =============================================================================
// Locale
// =============================================================================

mod locale {
    use super::*;

    #[test]
    fn changed_locale_sets_cookie() {
        let fixture = Fixture::new();
        let response = fixture.get("/app/direct/0/Home/french");

        assert_eq!(response.cookies.len(), 1);
        assert_eq!(response.cookies[0].name, "tessera-locale");
        assert_eq!(response.cookies[0].value, "fr");
    }

    #[test]
    fn unchanged_locale_sets_nothing() {
        let fixture = Fixture::new();
        let request = WebRequest::new("/app/direct/0/Home/french").with_cookie("tessera-locale", "fr");
        let response = fixture.send(request);
        assert!(response.cookies.is_empty());
    }

    #[test]
    fn malformed_cookie_is_configuration_error() {
        let fixture = Fixture::new();
        let request = WebRequest::new("/app").with_cookie("tessera-locale", "en_US_POSIX_EXTRA");
        let response = fixture.send(request);

        assert_eq!(response.status, 500);
        assert_eq!(fixture.reporter.codes(), vec!["ENGINE_LOCALE"]);
    }
}
