//! Core value types for Tessera.
//!
//! This crate holds the small, dependency-light values every other layer
//! shares: component addresses, locales, links and the unified error
//! code interface.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application SDK Layer                     │
//! │  (what page and component authors depend on)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tessera-types     : IdPath, Locale, Link, ErrorCode ◄ HERE  │
//! │  tessera-markup    : MarkupWrite, MarkupWriter              │
//! │  tessera-event     : listener declarations, invoker         │
//! │  tessera-component : Component trait, Page tree, Cycle      │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Runtime Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tessera-runtime   : config, request cycle, services, pool  │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Frontend Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tessera-app       : AppError, demo application             │
//! │  tessera-cli       : `tessera` binary                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use tessera_types::{IdPath, Link, Locale, ServicePath};
//!
//! let path = IdPath::parse("form.email").unwrap();
//! let link = Link::new(
//!     "/app",
//!     "direct",
//!     vec!["0".into(), "Home".into(), path.to_string()],
//!     Vec::new(),
//! );
//!
//! let decoded = ServicePath::decode("/app", &link.url(None)).unwrap();
//! assert_eq!(decoded.context[2], "form.email");
//!
//! let locale: Locale = "fr_CA".parse().unwrap();
//! assert_eq!(locale.country(), "CA");
//! ```

mod cycle_id;
mod error;
mod id_path;
mod link;
mod locale;

pub use cycle_id::CycleId;
pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id_path::{is_valid_id, IdPath, IdPathError, ID_PATH_SEPARATOR};
pub use link::{service, Link, LinkError, ServicePath, SERVICE_PARAMETER};
pub use locale::{Locale, LocaleError};
