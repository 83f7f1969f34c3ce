//! Buffered writers for inner rendering.
//!
//! A component that needs its body before it can write its own tag (a
//! link wrapping rendered content, a form that emits hidden fields after
//! its body) renders the body into a [`NestedWriter`]:
//!
//! ```text
//! parent:  <div><a href="..."   ← start tag open
//!                 │
//! nested:         └─ <img src="x"/>caption      (own buffer, own stack)
//!                 │
//! close(): parent.print_raw(buffer)
//! parent:  <div><a href="..."><img src="x"/>caption
//! ```
//!
//! The nested writer shares the parent's safety table. Its element stack
//! is independent: closing it ends only the elements it began. The
//! buffered text reaches the parent as a raw print, which ends the
//! parent's open start tag like any other write but never ends one of
//! the parent's elements.

use crate::safety::SafetyTable;
use crate::writer::{MarkupWrite, MarkupWriter};
use crate::MarkupError;

/// A writer that buffers its output and flushes it into a parent on close.
///
/// Dropping an unclosed `NestedWriter` closes it.
pub struct NestedWriter<'a> {
    inner: MarkupWriter<Vec<u8>>,
    parent: &'a mut dyn MarkupWrite,
}

impl<'a> NestedWriter<'a> {
    pub fn new(parent: &'a mut dyn MarkupWrite) -> Self {
        Self {
            inner: MarkupWriter::new(Vec::new(), parent.safety_table()),
            parent,
        }
    }

    fn close_into_parent(&mut self) -> Result<(), MarkupError> {
        let buffer = self.inner.finish()?;
        let content = String::from_utf8_lossy(&buffer);
        self.parent.print_raw(&content)
    }
}

impl std::fmt::Debug for NestedWriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NestedWriter")
            .field("inner", &self.inner)
            .field("parent_depth", &self.parent.depth())
            .finish()
    }
}

impl MarkupWrite for NestedWriter<'_> {
    fn begin(&mut self, name: &str) -> Result<(), MarkupError> {
        self.inner.begin(name)
    }

    fn begin_empty(&mut self, name: &str) -> Result<(), MarkupError> {
        self.inner.begin_empty(name)
    }

    fn attribute(&mut self, name: &str, value: &str) -> Result<(), MarkupError> {
        self.inner.attribute(name, value)
    }

    fn attribute_flag(&mut self, name: &str) -> Result<(), MarkupError> {
        self.inner.attribute_flag(name)
    }

    fn attribute_int(&mut self, name: &str, value: i64) -> Result<(), MarkupError> {
        self.inner.attribute_int(name, value)
    }

    fn close_tag(&mut self) -> Result<(), MarkupError> {
        self.inner.close_tag()
    }

    fn comment(&mut self, text: &str) -> Result<(), MarkupError> {
        self.inner.comment(text)
    }

    fn end(&mut self) -> Result<(), MarkupError> {
        self.inner.end()
    }

    fn end_element(&mut self, name: &str) -> Result<(), MarkupError> {
        self.inner.end_element(name)
    }

    fn print(&mut self, text: &str) -> Result<(), MarkupError> {
        self.inner.print(text)
    }

    fn print_char(&mut self, ch: char) -> Result<(), MarkupError> {
        self.inner.print_char(ch)
    }

    fn print_raw(&mut self, text: &str) -> Result<(), MarkupError> {
        self.inner.print_raw(text)
    }

    fn println(&mut self) -> Result<(), MarkupError> {
        self.inner.println()
    }

    // Buffered until close.
    fn flush(&mut self) -> Result<(), MarkupError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), MarkupError> {
        self.close_into_parent()
    }

    fn depth(&self) -> usize {
        self.inner.depth()
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    fn safety_table(&self) -> &'static SafetyTable {
        self.inner.safety_table()
    }

    fn nested_writer(&mut self) -> NestedWriter<'_> {
        NestedWriter::new(self)
    }
}

impl Drop for NestedWriter<'_> {
    fn drop(&mut self) {
        if self.inner.is_closed() {
            return;
        }
        if let Err(err) = self.close_into_parent() {
            tracing::warn!(error = %err, "failed to close nested writer on drop");
        }
    }
}
