//! Tessera Runtime - request cycle engine.
//!
//! This crate turns host requests into rendered pages: it decodes service
//! URLs, activates pooled page trees, replays form submissions, triggers
//! direct-link listeners and renders markup, recovering from stale links
//! and sessions along the way.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Application SDK Layer                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tessera-types     : IdPath, Link, Locale, ErrorCode        │
//! │  tessera-markup    : MarkupWrite, MarkupWriter              │
//! │  tessera-event     : ListenerDeclaration, Trigger           │
//! │  tessera-component : Component, Page, Cycle, builtins       │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Runtime Layer (THIS CRATE)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  config/   : TesseraConfig, ConfigLoader                    │
//! │  engine    : Engine, EngineBuilder                          │
//! │  cycle     : RequestCycle, CyclePhase                       │
//! │  service/  : direct, page, external, home, reset            │
//! │  pool      : PagePool, PageLease, PageSource                │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  (tessera-app: re-exports + AppError)                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! ## Request handling
//!
//! - [`Engine`]: dispatches a [`WebRequest`] and answers with a [`WebResponse`]
//! - [`RequestCycle`]: request-scoped state, implements [`Cycle`](tessera_component::Cycle)
//! - [`CyclePhase`]: `Dispatch → Activate → (Rewind) → Render → Cleanup`
//! - [`service`]: the [`EngineService`](service::EngineService) strategies
//!
//! ## Pages
//!
//! - [`ApplicationSpecification`]: page definitions and component aliases
//! - [`PageSource`]: pooled page instances handed out as [`PageLease`]s
//!
//! ## Request data
//!
//! - [`PartMap`]: multipart fields and uploads
//! - [`RequestLocaleManager`]: locale cookie negotiation
//!
//! ## Failures
//!
//! - [`EngineError`] / [`ErrorKind`]: how a request ends when it fails
//! - [`ExceptionReporter`]: where configuration failures are reported
//!
//! ## [`config`] - Configuration Management
//!
//! Hierarchical configuration with layered merging:
//!
//! - [`TesseraConfig`](config::TesseraConfig): unified configuration
//! - [`ConfigLoader`](config::ConfigLoader): multi-source loader

mod codec;
pub mod config;
mod cycle;
mod engine;
mod error;
mod locale;
pub mod multipart;
mod phase;
mod pool;
mod reporter;
mod request;
pub mod service;
mod specification;

pub use codec::LinkCodec;
pub use cycle::RequestCycle;
pub use engine::{Engine, EngineBuilder};
pub use error::{EngineError, ErrorKind};
pub use locale::{RequestLocaleManager, LOCALE_COOKIE_MAX_AGE};
pub use multipart::{FileContent, MultipartBody, PartMap, RawPart, UploadPart};
pub use phase::CyclePhase;
pub use pool::{PageLease, PagePool, PageSource};
pub use reporter::{ExceptionReport, ExceptionReporter, MemoryReporter, TracingReporter};
pub use request::{Cookie, SessionState, WebRequest, WebResponse, HTML_CONTENT_TYPE};
pub use specification::{
    is_default_alias, ApplicationSpecification, ComponentFactory, ComponentSpecification,
    ExternalHook, PageDefinition, PageSpecification, EXCEPTION_PAGE, STALE_LINK_PAGE,
    STALE_SESSION_PAGE,
};
