//! Markup generation for Tessera.
//!
//! Components never build HTML strings by hand: they drive a
//! [`MarkupWrite`] which tracks open elements, escapes text against a
//! [`SafetyTable`] and guarantees balanced output on close.
//!
//! # Writer State
//!
//! ```text
//!                begin("a")            attribute(..) ok
//!   ┌─────────┐ ───────────► ┌──────────────┐
//!   │ no open │              │ start tag    │
//!   │   tag   │ ◄─────────── │ open (<a ..) │
//!   └─────────┘  any write   └──────────────┘
//!        │       (print, comment, end, raw, nested close)
//!        │
//!        │ close(): end every open element, flush, release sink
//!        ▼
//!   ┌─────────┐
//!   │ closed  │  every call ─► MarkupError::Closed
//!   └─────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use tessera_markup::{MarkupWrite, MarkupWriter};
//!
//! let mut writer = MarkupWriter::html(Vec::new());
//! writer.begin("ul").unwrap();
//! for item in ["fish & chips", "<script>"] {
//!     writer.begin("li").unwrap();
//!     writer.print(item).unwrap();
//!     writer.end().unwrap();
//! }
//! let html = String::from_utf8(writer.finish().unwrap()).unwrap();
//! assert_eq!(
//!     html,
//!     "<ul><li>fish &amp; chips</li><li>&lt;script&gt;</li></ul>"
//! );
//! ```

mod error;
mod nested;
pub mod safety;
mod writer;

pub use error::MarkupError;
pub use nested::NestedWriter;
pub use safety::SafetyTable;
pub use writer::{MarkupWrite, MarkupWriter};
