//! Event binding for Tessera pages.
//!
//! Pages declare which of their methods listen to which component events.
//! The declarations are collected into a [`ComponentEventInvoker`]; during
//! a rewind the component layer asks the invoker which listeners belong to
//! the [`Trigger`] and fires them.
//!
//! # Flow
//!
//! ```text
//! page build                       request (rewind)
//! ──────────                       ────────────────
//! ListenerDeclaration              Trigger { form.email, onClick }
//!     │ connect()                      │
//!     ▼                                ▼
//! ComponentEventInvoker ──────► listeners_for(form.email, onClick)
//!   component_events                   │
//!   element_events                     ▼
//!                                  [EventBoundListener] → page method
//! ```
//!
//! Errors are reported as [`EventError`] with `EVENT_` codes.

mod declaration;
mod error;
mod invoker;
mod listener;

pub use declaration::ListenerDeclaration;
pub use error::EventError;
pub use invoker::{ComponentEventInvoker, Trigger};
pub use listener::{ComponentEventProperty, EventBoundListener};
