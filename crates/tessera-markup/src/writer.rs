//! The [`MarkupWrite`] contract and its stream-backed implementation.

use std::io::Write;

use crate::nested::NestedWriter;
use crate::safety::{SafetyTable, HTML, XML};
use crate::MarkupError;

/// Stack-based, entity-aware markup output.
///
/// At most one start tag is open at a time. Attributes may only be added
/// while it is open; every other write closes it first.
///
/// The trait is object safe: components render through
/// `&mut dyn MarkupWrite`.
pub trait MarkupWrite {
    /// Closes any open tag, pushes `name` and opens `<name`.
    fn begin(&mut self, name: &str) -> Result<(), MarkupError>;

    /// Like [`begin`](Self::begin) without pushing; closes as `<name/>`.
    fn begin_empty(&mut self, name: &str) -> Result<(), MarkupError>;

    /// Writes ` name="value"` into the open tag, escaping the value.
    fn attribute(&mut self, name: &str, value: &str) -> Result<(), MarkupError>;

    /// Writes a valueless attribute such as ` checked`.
    fn attribute_flag(&mut self, name: &str) -> Result<(), MarkupError>;

    fn attribute_int(&mut self, name: &str, value: i64) -> Result<(), MarkupError>;

    /// Ends the open start tag with `>` (or `/>` for empty elements).
    fn close_tag(&mut self) -> Result<(), MarkupError>;

    /// Writes `<!-- text -->` followed by a line break.
    fn comment(&mut self, text: &str) -> Result<(), MarkupError>;

    /// Pops the innermost element and writes its end tag.
    fn end(&mut self) -> Result<(), MarkupError>;

    /// Pops and ends elements until `name` has been ended.
    ///
    /// Nothing is written when `name` is not open.
    fn end_element(&mut self, name: &str) -> Result<(), MarkupError>;

    /// Writes escaped text.
    fn print(&mut self, text: &str) -> Result<(), MarkupError>;

    fn print_char(&mut self, ch: char) -> Result<(), MarkupError>;

    /// Writes text without escaping.
    fn print_raw(&mut self, text: &str) -> Result<(), MarkupError>;

    fn println(&mut self) -> Result<(), MarkupError>;

    fn flush(&mut self) -> Result<(), MarkupError>;

    /// Ends all open elements, flushes and releases the sink.
    fn close(&mut self) -> Result<(), MarkupError>;

    /// Number of open elements.
    fn depth(&self) -> usize;

    fn is_closed(&self) -> bool;

    fn safety_table(&self) -> &'static SafetyTable;

    fn content_type(&self) -> &'static str {
        self.safety_table().content_type()
    }

    /// Returns a buffering writer whose output lands here when closed.
    fn nested_writer(&mut self) -> NestedWriter<'_>;
}

/// [`MarkupWrite`] over any [`std::io::Write`] sink.
///
/// # Example
///
/// ```
/// use tessera_markup::{MarkupWrite, MarkupWriter};
///
/// let mut writer = MarkupWriter::html(Vec::new());
/// writer.begin("a").unwrap();
/// writer.attribute("href", "/app/page/Home?x=1&y=2").unwrap();
/// writer.print("Home & away").unwrap();
/// let html = String::from_utf8(writer.finish().unwrap()).unwrap();
/// assert_eq!(html, r#"<a href="/app/page/Home?x=1&amp;y=2">Home &amp; away</a>"#);
/// ```
#[derive(Debug)]
pub struct MarkupWriter<W: Write> {
    sink: Option<W>,
    table: &'static SafetyTable,
    open_tag: bool,
    empty_tag: bool,
    stack: Vec<String>,
}

impl<W: Write> MarkupWriter<W> {
    #[must_use]
    pub fn new(sink: W, table: &'static SafetyTable) -> Self {
        Self {
            sink: Some(sink),
            table,
            open_tag: false,
            empty_tag: false,
            stack: Vec::new(),
        }
    }

    /// Writer using the HTML safety table.
    #[must_use]
    pub fn html(sink: W) -> Self {
        Self::new(sink, &HTML)
    }

    /// Writer using the XML safety table.
    #[must_use]
    pub fn xml(sink: W) -> Self {
        Self::new(sink, &XML)
    }

    /// Names of the open elements, outermost first.
    #[must_use]
    pub fn open_elements(&self) -> &[String] {
        &self.stack
    }

    /// Closes the writer and hands back the sink.
    ///
    /// # Errors
    ///
    /// [`MarkupError::Closed`] if already closed, or a sink failure.
    pub fn finish(&mut self) -> Result<W, MarkupError> {
        self.ensure_open()?;
        self.close_open_tag()?;
        while let Some(name) = self.stack.pop() {
            self.write_end_tag(&name)?;
        }
        let mut sink = self.sink.take().ok_or(MarkupError::Closed)?;
        sink.flush()?;
        Ok(sink)
    }

    fn ensure_open(&self) -> Result<(), MarkupError> {
        if self.sink.is_some() {
            Ok(())
        } else {
            Err(MarkupError::Closed)
        }
    }

    fn ensure_tag_open(&self) -> Result<(), MarkupError> {
        self.ensure_open()?;
        if self.open_tag {
            Ok(())
        } else {
            Err(MarkupError::TagNotOpen)
        }
    }

    fn sink(&mut self) -> Result<&mut W, MarkupError> {
        self.sink.as_mut().ok_or(MarkupError::Closed)
    }

    fn write_str(&mut self, text: &str) -> Result<(), MarkupError> {
        self.sink()?.write_all(text.as_bytes())?;
        Ok(())
    }

    fn close_open_tag(&mut self) -> Result<(), MarkupError> {
        if self.open_tag {
            self.close_tag()?;
        }
        Ok(())
    }

    fn write_end_tag(&mut self, name: &str) -> Result<(), MarkupError> {
        let sink = self.sink()?;
        write!(sink, "</{name}>")?;
        Ok(())
    }

    fn start(&mut self, name: &str, empty: bool) -> Result<(), MarkupError> {
        self.ensure_open()?;
        self.close_open_tag()?;
        self.write_str("<")?;
        self.write_str(name)?;
        if !empty {
            self.stack.push(name.to_string());
        }
        self.open_tag = true;
        self.empty_tag = empty;
        Ok(())
    }

    /// Writes `text`, replacing unsafe characters by entities.
    fn safe_print(&mut self, text: &str, in_attribute: bool) -> Result<(), MarkupError> {
        let table = self.table;
        let sink = self.sink()?;
        let mut start = 0;
        for (idx, ch) in text.char_indices() {
            if let Some(entity) = table.escape(ch, in_attribute) {
                if start < idx {
                    sink.write_all(text[start..idx].as_bytes())?;
                }
                sink.write_all(entity.as_bytes())?;
                start = idx + ch.len_utf8();
            }
        }
        if start < text.len() {
            sink.write_all(text[start..].as_bytes())?;
        }
        Ok(())
    }
}

impl<W: Write> MarkupWrite for MarkupWriter<W> {
    fn begin(&mut self, name: &str) -> Result<(), MarkupError> {
        self.start(name, false)
    }

    fn begin_empty(&mut self, name: &str) -> Result<(), MarkupError> {
        self.start(name, true)
    }

    fn attribute(&mut self, name: &str, value: &str) -> Result<(), MarkupError> {
        self.ensure_tag_open()?;
        self.write_str(" ")?;
        self.write_str(name)?;
        self.write_str("=\"")?;
        self.safe_print(value, true)?;
        self.write_str("\"")
    }

    fn attribute_flag(&mut self, name: &str) -> Result<(), MarkupError> {
        self.ensure_tag_open()?;
        self.write_str(" ")?;
        self.write_str(name)
    }

    fn attribute_int(&mut self, name: &str, value: i64) -> Result<(), MarkupError> {
        self.ensure_tag_open()?;
        let sink = self.sink()?;
        write!(sink, " {name}=\"{value}\"")?;
        Ok(())
    }

    fn close_tag(&mut self) -> Result<(), MarkupError> {
        self.ensure_tag_open()?;
        let closing = if self.empty_tag { "/>" } else { ">" };
        self.write_str(closing)?;
        self.open_tag = false;
        self.empty_tag = false;
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), MarkupError> {
        self.ensure_open()?;
        self.close_open_tag()?;
        let sink = self.sink()?;
        writeln!(sink, "<!-- {text} -->")?;
        Ok(())
    }

    fn end(&mut self) -> Result<(), MarkupError> {
        self.ensure_open()?;
        if self.stack.is_empty() {
            return Err(MarkupError::NoOpenElement);
        }
        self.close_open_tag()?;
        if let Some(name) = self.stack.pop() {
            self.write_end_tag(&name)?;
        }
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), MarkupError> {
        self.ensure_open()?;
        if !self.stack.iter().any(|open| open == name) {
            return Err(MarkupError::ElementNotOpen(name.to_string()));
        }
        self.close_open_tag()?;
        while let Some(open) = self.stack.pop() {
            self.write_end_tag(&open)?;
            if open == name {
                break;
            }
        }
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<(), MarkupError> {
        self.ensure_open()?;
        self.close_open_tag()?;
        self.safe_print(text, false)
    }

    fn print_char(&mut self, ch: char) -> Result<(), MarkupError> {
        let mut buf = [0u8; 4];
        self.print(ch.encode_utf8(&mut buf))
    }

    fn print_raw(&mut self, text: &str) -> Result<(), MarkupError> {
        self.ensure_open()?;
        self.close_open_tag()?;
        self.write_str(text)
    }

    fn println(&mut self) -> Result<(), MarkupError> {
        self.ensure_open()?;
        self.close_open_tag()?;
        self.write_str("\n")
    }

    fn flush(&mut self) -> Result<(), MarkupError> {
        self.sink()?.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), MarkupError> {
        self.finish().map(drop)
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn is_closed(&self) -> bool {
        self.sink.is_none()
    }

    fn safety_table(&self) -> &'static SafetyTable {
        self.table
    }

    fn nested_writer(&mut self) -> NestedWriter<'_> {
        NestedWriter::new(self)
    }
}
