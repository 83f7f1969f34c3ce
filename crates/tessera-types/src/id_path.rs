//! Component addressing within a page.
//!
//! Every component has a local id (unique among its siblings) and an
//! [`IdPath`]: the dot-separated list of local ids from the page root down
//! to the component. The page itself is addressed by the empty path.
//!
//! ```text
//! Home                    (root, "")
//! ├── form                "form"
//! │   ├── email           "form.email"
//! │   └── submit          "form.submit"
//! └── logout              "logout"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::ErrorCode;

/// Separator between local ids.
pub const ID_PATH_SEPARATOR: char = '.';

/// Rejected id path text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdPathError {
    /// The path contains an empty segment (`"a..b"`, `".a"`, `"a."`).
    #[error("id path '{0}' contains an empty segment")]
    EmptySegment(String),

    /// A local id contains the separator or whitespace.
    #[error("invalid component id '{0}'")]
    InvalidId(String),
}

impl ErrorCode for IdPathError {
    fn code(&self) -> &'static str {
        match self {
            Self::EmptySegment(_) => "ID_PATH_EMPTY_SEGMENT",
            Self::InvalidId(_) => "ID_PATH_INVALID_ID",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Dot-separated path from the page root to a component.
///
/// # Example
///
/// ```
/// use tessera_types::IdPath;
///
/// let form = IdPath::root().child("form").unwrap();
/// let email = form.child("email").unwrap();
/// assert_eq!(email.as_str(), "form.email");
/// assert_eq!(email.leaf(), Some("email"));
/// assert_eq!(email.parent(), Some(form));
/// assert_eq!(IdPath::parse("form.email").unwrap(), email);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdPath(String);

impl IdPath {
    /// The path of the page itself.
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parses a dot-separated path. The empty string is the root.
    ///
    /// # Errors
    ///
    /// Returns [`IdPathError::EmptySegment`] for paths such as `"a..b"`.
    pub fn parse(path: &str) -> Result<Self, IdPathError> {
        if path.is_empty() {
            return Ok(Self::root());
        }
        for segment in path.split(ID_PATH_SEPARATOR) {
            if segment.is_empty() {
                return Err(IdPathError::EmptySegment(path.to_string()));
            }
            if !is_valid_id(segment) {
                return Err(IdPathError::InvalidId(segment.to_string()));
            }
        }
        Ok(Self(path.to_string()))
    }

    /// Returns the path of a direct child with local id `id`.
    ///
    /// # Errors
    ///
    /// Returns [`IdPathError::InvalidId`] if `id` is empty, contains the
    /// separator or contains whitespace.
    pub fn child(&self, id: &str) -> Result<Self, IdPathError> {
        if !is_valid_id(id) {
            return Err(IdPathError::InvalidId(id.to_string()));
        }
        if self.is_root() {
            Ok(Self(id.to_string()))
        } else {
            Ok(Self(format!("{}{}{}", self.0, ID_PATH_SEPARATOR, id)))
        }
    }

    /// Returns `true` for the page root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the local id of the addressed component.
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Returns the path of the containing component, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(ID_PATH_SEPARATOR) {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Iterates over local ids, root first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0
            .split(ID_PATH_SEPARATOR)
            .filter(|segment| !segment.is_empty())
    }

    /// Number of segments (0 for the root).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Returns the textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns `true` if `id` can be used as a component's local id.
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && !id.contains(ID_PATH_SEPARATOR)
        && !id.chars().any(char::is_whitespace)
}

impl fmt::Display for IdPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for IdPath {
    type Error = IdPathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IdPath> for String {
    fn from(value: IdPath) -> Self {
        value.0
    }
}
