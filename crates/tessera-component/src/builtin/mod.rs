//! Built-in components.
//!
//! A small set of components, enough to build forms and navigation:
//!
//! | Component | Renders | Capabilities |
//! |-----------|---------|--------------|
//! | [`Any`] | any element, attributes from bindings, then its body | - |
//! | [`Insert`] | a bound value as text | - |
//! | [`Form`] | `<form>` posting to the direct service | `Direct`, `Form` |
//! | [`TextField`] | `<input>` bound to a page property | - |
//! | [`DirectLink`] | `<a>` triggering a listener | `Direct` |
//! | [`PageLink`] | `<a>` to another page | - |
//! | [`ButtonLink`] | `<button>` navigating to another page | - |
//! | [`Block`] | nothing in place; its body is rendered elsewhere | - |
//! | [`RenderBlock`] | the body of a block, possibly from another page | - |
//!
//! All built-ins deserialize from JSON component configuration, which is
//! how the runtime's alias table creates them.

mod any;
mod binding;
mod block;
mod button_link;
mod direct_link;
mod form;
mod insert;
mod link;
mod page_link;
mod text_field;

pub use any::Any;
pub use binding::Binding;
pub use block::{Block, RenderBlock};
pub use button_link::ButtonLink;
pub use direct_link::DirectLink;
pub use form::{Form, FormMethod};
pub use insert::Insert;
pub use link::{LinkStyle, LINK_COMPONENT_ATTRIBUTE};
pub use page_link::PageLink;
pub use text_field::TextField;
