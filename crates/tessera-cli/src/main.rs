//! Tessera CLI - serve one request through the guestbook demo.
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`TESSERA_*`)
//! 3. Project config (`.tessera/config.toml` in the project root)
//! 4. Global config (`~/.tessera/config.toml`)
//! 5. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `TESSERA_DEBUG`: exception pages include the cause chain
//! - `TESSERA_RESET_ENABLED`: enable the reset service
//! - `TESSERA_HOME_PAGE`: page answered by the home service
//! - `TESSERA_SERVLET_PATH`: URL prefix of every engine link
//! - `TESSERA_DEFAULT_LOCALE`: locale used without cookie or preference
//!
//! # Output
//!
//! The response body goes to stdout, logs go to stderr. A response with a
//! 5xx status exits with code 1.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tessera_app::demo::demo_engine;
use tessera_app::{
    CliOverrides, ConfigLoader, ExceptionReporter, Locale, SessionState, TesseraConfig,
    TracingReporter, WebRequest, WebResponse,
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Tessera CLI - serve one request through the guestbook demo
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging and cause chains on exception pages
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Project root directory (defaults to current directory)
    #[arg(short = 'C', long)]
    project: Option<PathBuf>,

    /// Session state of the simulated client
    #[arg(long, value_enum, default_value_t = SessionArg::None)]
    session: SessionArg,

    /// Request cookie, repeatable
    #[arg(long = "cookie", value_name = "NAME=VALUE", value_parser = parse_cookie)]
    cookies: Vec<(String, String)>,

    /// Locale the client prefers
    #[arg(long, value_name = "LOCALE")]
    locale: Option<String>,

    /// Enable the reset service (also: TESSERA_RESET_ENABLED)
    #[arg(long)]
    reset_enabled: bool,

    /// Answer stale sessions with a redirect
    #[arg(long)]
    redirect_on_stale: bool,

    /// Override the servlet path (also: TESSERA_SERVLET_PATH)
    #[arg(long, value_name = "PATH")]
    servlet_path: Option<String>,

    /// Print status line, location and cookies before the body
    #[arg(short, long)]
    include: bool,

    /// Print the whole response as JSON
    #[arg(long, conflicts_with = "include")]
    json: bool,

    /// Request URL, query string included
    #[arg(default_value = "/app")]
    url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SessionArg {
    None,
    New,
    Established,
}

impl From<SessionArg> for SessionState {
    fn from(arg: SessionArg) -> Self {
        match arg {
            SessionArg::None => SessionState::None,
            SessionArg::New => SessionState::New,
            SessionArg::Established => SessionState::Established,
        }
    }
}

fn parse_cookie(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

/// Merges file/env config and applies CLI argument overrides on top.
fn resolve_config(args: &Args, project_root: &std::path::Path) -> Result<TesseraConfig> {
    let mut config = ConfigLoader::new()
        .with_project_root(project_root)
        .load()
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;

    let mut overrides = CliOverrides::new().servlet_path_opt(args.servlet_path.clone());
    if args.debug {
        overrides = overrides.debug(true);
    }
    if args.reset_enabled {
        overrides = overrides.reset_enabled(true);
    }
    if args.redirect_on_stale {
        overrides = overrides.redirect_on_stale(true);
    }
    overrides.apply(&mut config);
    Ok(config)
}

fn build_request(args: &Args) -> Result<WebRequest> {
    let mut request = WebRequest::from_url(&args.url)
        .map_err(|e| anyhow::anyhow!("Invalid URL '{}': {e}", args.url))?
        .with_session(args.session.into());
    for (name, value) in &args.cookies {
        request = request.with_cookie(name.as_str(), value.as_str());
    }
    if let Some(ref locale) = args.locale {
        let locale = Locale::parse(locale).map_err(|e| anyhow::anyhow!("Invalid locale: {e}"))?;
        request = request.with_preferred_locale(locale);
    }
    Ok(request)
}

fn print_response(args: &Args, response: &WebResponse) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }
    if args.include {
        println!("HTTP {}", response.status);
        println!("Content-Type: {}", response.content_type);
        if let Some(ref location) = response.location {
            println!("Location: {location}");
        }
        for cookie in &response.cookies {
            println!("Set-Cookie: {}={}", cookie.name, cookie.value);
        }
        println!();
    }
    println!("{}", response.body);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Terminal filter: --debug > --verbose > RUST_LOG env > default "warn"
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    let project_root = args.project.clone().unwrap_or_else(|| {
        std::env::current_dir().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to get current directory, using '.'");
            PathBuf::from(".")
        })
    });
    info!(path = %project_root.display(), "Project root");

    let config = resolve_config(&args, &project_root)?;
    let reporter: Arc<dyn ExceptionReporter> = Arc::new(TracingReporter);
    let engine = demo_engine(config, Some(reporter))?;

    let request = build_request(&args)?;
    debug!(url = %args.url, "Serving request");
    let response = engine.service(request)?;
    info!(status = response.status, "Request served");

    print_response(&args, &response)?;
    if response.status >= 500 {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["tessera"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn cookie_parser() {
        assert_eq!(
            parse_cookie("tessera-locale=fr"),
            Ok(("tessera-locale".to_string(), "fr".to_string()))
        );
        assert_eq!(parse_cookie("a=b=c"), Ok(("a".to_string(), "b=c".to_string())));
        assert!(parse_cookie("novalue").is_err());
        assert!(parse_cookie("=x").is_err());
    }

    #[test]
    fn defaults() {
        let args = args(&[]);
        assert_eq!(args.url, "/app");
        assert_eq!(args.session, SessionArg::None);
        assert!(args.cookies.is_empty());
    }

    #[test]
    fn request_carries_flags() {
        let args = args(&[
            "--session",
            "established",
            "--cookie",
            "tessera-locale=de",
            "--locale",
            "fr_CA",
            "/app/page/Home?sp=1",
        ]);
        let request = build_request(&args).expect("valid request");

        assert!(request.has_established_session());
        assert_eq!(request.cookie("tessera-locale"), Some("de"));
        assert_eq!(request.preferred_locale(), Some(&Locale::new("fr", "CA", "")));
        assert_eq!(request.service_parameters(), vec!["1".to_string()]);
    }

    #[test]
    fn overrides_applied_last() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let args = args(&["--reset-enabled", "--servlet-path", "/shop"]);
        let config = resolve_config(&args, tmp.path()).expect("config");

        assert!(config.engine.reset_service_enabled);
        assert_eq!(config.engine.servlet_path, "/shop");
    }
}
