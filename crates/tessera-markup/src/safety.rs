//! Per-character content safety tables.
//!
//! A table decides, for each character below its size, whether the
//! character may be written verbatim and which named entity replaces it
//! when it may not. Characters at or beyond the table size are always
//! unsafe and fall back to a numeric entity (`&#N;`).
//!
//! ```text
//! char   safe?   entity
//! ─────  ──────  ───────
//! 'a'    yes     -
//! '<'    no      &lt;
//! 'é'    no      &eacute;   (HTML)  /  &#233;  (XML)
//! '€'    no      &#8364;    (beyond table)
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

/// Number of characters covered by the built-in tables (Latin-1).
const TABLE_SIZE: usize = 256;

/// Latin-1 supplement entity names, U+00A0 through U+00FF.
const LATIN1_ENTITIES: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect", //
    "uml", "copy", "ordf", "laquo", "not", "shy", "reg", "macr", //
    "deg", "plusmn", "sup2", "sup3", "acute", "micro", "para", "middot", //
    "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest", //
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil", //
    "Egrave", "Eacute", "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml", //
    "ETH", "Ntilde", "Ograve", "Oacute", "Ocirc", "Otilde", "Ouml", "times", //
    "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute", "THORN", "szlig", //
    "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil", //
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml", //
    "eth", "ntilde", "ograve", "oacute", "ocirc", "otilde", "ouml", "divide", //
    "oslash", "ugrave", "uacute", "ucirc", "uuml", "yacute", "thorn", "yuml", //
];

/// HTML table: printable ASCII except `< > & "`, named Latin-1 entities.
pub static HTML: LazyLock<SafetyTable> = LazyLock::new(|| {
    let mut table = SafetyTable::new("text/html", TABLE_SIZE)
        .with_safe_range(0x20..=0x7e)
        .with_safe_chars(&['\t', '\n', '\r'])
        .with_entity('"', "quot")
        .with_entity('<', "lt")
        .with_entity('>', "gt")
        .with_entity('&', "amp");
    for (offset, name) in LATIN1_ENTITIES.iter().enumerate() {
        if let Some(ch) = char::from_u32(0xa0 + offset as u32) {
            table = table.with_entity(ch, name);
        }
    }
    table
});

/// XML table: printable ASCII except `< > & " '`, everything else numeric.
pub static XML: LazyLock<SafetyTable> = LazyLock::new(|| {
    SafetyTable::new("text/xml", TABLE_SIZE)
        .with_safe_range(0x20..=0x7e)
        .with_safe_chars(&['\t', '\n', '\r'])
        .with_entity('"', "quot")
        .with_entity('\'', "apos")
        .with_entity('<', "lt")
        .with_entity('>', "gt")
        .with_entity('&', "amp")
});

/// Content type plus per-character safety and entity mapping.
#[derive(Debug, Clone)]
pub struct SafetyTable {
    content_type: &'static str,
    safe: Vec<bool>,
    entities: Vec<Option<String>>,
}

impl SafetyTable {
    /// Creates a table of `size` characters, all unsafe and entity-less.
    #[must_use]
    pub fn new(content_type: &'static str, size: usize) -> Self {
        Self {
            content_type,
            safe: vec![false; size],
            entities: vec![None; size],
        }
    }

    /// Marks every character in `range` safe.
    #[must_use]
    pub fn with_safe_range(mut self, range: std::ops::RangeInclusive<u32>) -> Self {
        for code in range {
            if let Some(slot) = self.safe.get_mut(code as usize) {
                *slot = true;
            }
        }
        self
    }

    #[must_use]
    pub fn with_safe_chars(mut self, chars: &[char]) -> Self {
        for &ch in chars {
            if let Some(slot) = self.safe.get_mut(ch as usize) {
                *slot = true;
            }
        }
        self
    }

    /// Marks `ch` unsafe and maps it to `&name;`.
    #[must_use]
    pub fn with_entity(mut self, ch: char, name: &str) -> Self {
        let idx = ch as usize;
        if idx < self.safe.len() {
            self.safe[idx] = false;
            self.entities[idx] = Some(format!("&{name};"));
        }
        self
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Returns `true` if `ch` may be written verbatim.
    ///
    /// In attribute values the double quote is never safe.
    #[must_use]
    pub fn is_safe(&self, ch: char, in_attribute: bool) -> bool {
        if in_attribute && ch == '"' {
            return false;
        }
        self.safe.get(ch as usize).copied().unwrap_or(false)
    }

    /// Returns the replacement for `ch`, or `None` if it is safe.
    #[must_use]
    pub fn escape(&self, ch: char, in_attribute: bool) -> Option<Cow<'_, str>> {
        if self.is_safe(ch, in_attribute) {
            return None;
        }
        match self.entities.get(ch as usize) {
            Some(Some(entity)) => Some(Cow::Borrowed(entity.as_str())),
            _ => Some(Cow::Owned(format!("&#{};", ch as u32))),
        }
    }
}
