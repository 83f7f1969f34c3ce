//! Tessera Application Layer.
//!
//! This crate provides:
//!
//! - **Re-exports**: convenient access to all Tessera crates
//! - **AppError**: unified application-level error type
//! - **CliOverrides**: highest-priority configuration layer for hosts
//! - **demo**: the guestbook application served by `tessera-cli`
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application SDK Layer                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tessera-types, tessera-markup, tessera-event,              │
//! │  tessera-component                                          │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Runtime Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tessera-runtime (engine, cycle, services, pool)            │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Application Layer  ◄── HERE                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tessera-app (re-exports + AppError + demo)                 │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Frontend Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tessera-cli (uses AppError → anyhow/eprintln)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Error Handling Strategy
//!
//! ```text
//! Internal Errors (EngineError, ConfigError)
//!                    ↓ From impl
//!               AppError (this crate)
//!                    ↓ anyhow::Error / eprintln
//!               CLI output
//! ```

pub mod demo;
mod error;
mod overrides;

pub use error::AppError;
pub use overrides::CliOverrides;

// Re-export from Application SDK Layer
pub use tessera_component::builtin;
pub use tessera_component::{
    Component, ComponentAddress, ComponentContext, ComponentError, Cycle, Direct, FormComponent,
    ListenerContext, Page, PageBuilder,
};
pub use tessera_event::{EventError, ListenerDeclaration, Trigger};
pub use tessera_markup::{MarkupError, MarkupWrite, MarkupWriter};
pub use tessera_types::{CycleId, ErrorCode, IdPath, Link, Locale};

// Re-export from Runtime Layer
pub use tessera_runtime::config::{ConfigError, ConfigLoader, TesseraConfig};
pub use tessera_runtime::{
    ApplicationSpecification, Cookie, Engine, EngineBuilder, EngineError, ErrorKind,
    ExceptionReporter, MemoryReporter, MultipartBody, PageDefinition, PageSpecification,
    SessionState, TracingReporter, WebRequest, WebResponse,
};
