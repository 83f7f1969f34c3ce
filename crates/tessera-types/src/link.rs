//! Links: serializable descriptors of server-side actions.
//!
//! A [`Link`] names a service, carries the service's ordered context and
//! optional service parameters, and renders to a URL:
//!
//! ```text
//! /app/direct/1/Home/form.email?sp=42&sp=blue#top
//!  │    │      └──── context ────┘  └─ parameters ─┘
//!  │    └ service
//!  └ servlet path
//! ```
//!
//! [`ServicePath::decode`] performs the inverse for the path portion;
//! query parameters are decoded by the host.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

use crate::ErrorCode;

/// Query parameter name carrying service parameters.
pub const SERVICE_PARAMETER: &str = "sp";

/// Names of the built-in services.
pub mod service {
    pub const DIRECT: &str = "direct";
    pub const EXTERNAL: &str = "external";
    pub const HOME: &str = "home";
    pub const PAGE: &str = "page";
    pub const RESET: &str = "reset";
}

/// Failure decoding a request path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The path does not start with the servlet path.
    #[error("path '{path}' is outside servlet path '{servlet_path}'")]
    OutsideServlet { path: String, servlet_path: String },

    /// A path segment is not valid percent-encoded UTF-8.
    #[error("malformed path segment '{0}'")]
    MalformedSegment(String),
}

impl ErrorCode for LinkError {
    fn code(&self) -> &'static str {
        match self {
            Self::OutsideServlet { .. } => "LINK_OUTSIDE_SERVLET",
            Self::MalformedSegment(_) => "LINK_MALFORMED_SEGMENT",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Immutable descriptor of a server-side action.
///
/// The context is frozen at construction: there is no way to mutate it
/// through a `Link`.
///
/// # Example
///
/// ```
/// use tessera_types::Link;
///
/// let link = Link::new(
///     "/app",
///     "direct",
///     vec!["0".into(), "Home".into(), "form".into()],
///     vec!["a b".into()],
/// );
/// assert_eq!(link.path(), "/app/direct/0/Home/form");
/// assert_eq!(link.url(Some("top")), "/app/direct/0/Home/form?sp=a%20b#top");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    servlet_path: String,
    service: String,
    context: Box<[String]>,
    parameters: Box<[String]>,
}

impl Link {
    #[must_use]
    pub fn new(
        servlet_path: impl Into<String>,
        service: impl Into<String>,
        context: Vec<String>,
        parameters: Vec<String>,
    ) -> Self {
        Self {
            servlet_path: normalize_servlet_path(&servlet_path.into()),
            service: service.into(),
            context: context.into_boxed_slice(),
            parameters: parameters.into_boxed_slice(),
        }
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    #[must_use]
    pub fn context(&self) -> &[String] {
        &self.context
    }

    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    #[must_use]
    pub fn servlet_path(&self) -> &str {
        &self.servlet_path
    }

    /// Path portion: servlet path, service, then each context slot.
    #[must_use]
    pub fn path(&self) -> String {
        let mut path = String::with_capacity(64);
        path.push_str(&self.servlet_path);
        path.push('/');
        path.push_str(&urlencoding::encode(&self.service));
        for slot in self.context.iter() {
            path.push('/');
            path.push_str(&urlencoding::encode(slot));
        }
        path
    }

    /// Full URL with service parameters and an optional anchor.
    #[must_use]
    pub fn url(&self, anchor: Option<&str>) -> String {
        let mut url = self.path();
        for (idx, parameter) in self.parameters.iter().enumerate() {
            let sep = if idx == 0 { '?' } else { '&' };
            let _ = write!(
                url,
                "{sep}{SERVICE_PARAMETER}={}",
                urlencoding::encode(parameter)
            );
        }
        if let Some(anchor) = anchor {
            url.push('#');
            url.push_str(anchor);
        }
        url
    }
}

/// Service name and context decoded from a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePath {
    /// Service name; `None` when the path stops at the servlet path.
    pub service: Option<String>,
    /// Ordered context slots.
    pub context: Vec<String>,
}

impl ServicePath {
    /// Decodes `path` relative to `servlet_path`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError`] if the path is outside the servlet or a
    /// segment is not valid percent-encoding.
    ///
    /// ```
    /// use tessera_types::ServicePath;
    ///
    /// let decoded = ServicePath::decode("/app", "/app/page/Home%20Page").unwrap();
    /// assert_eq!(decoded.service.as_deref(), Some("page"));
    /// assert_eq!(decoded.context, vec!["Home Page".to_string()]);
    /// ```
    pub fn decode(servlet_path: &str, path: &str) -> Result<Self, LinkError> {
        let servlet_path = normalize_servlet_path(servlet_path);
        let path = path.split(['?', '#']).next().unwrap_or_default();

        let rest = path
            .strip_prefix(servlet_path.as_str())
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .ok_or_else(|| LinkError::OutsideServlet {
                path: path.to_string(),
                servlet_path: servlet_path.clone(),
            })?;

        // Only the servlet root tolerates a trailing slash; past the
        // service name an empty last segment is an empty context slot.
        let mut segments = rest.split('/').skip(1);
        let service = match segments.next() {
            Some(service) if !service.is_empty() => Some(decode_segment(service)?),
            _ => None,
        };
        let context = segments.map(decode_segment).collect::<Result<Vec<_>, _>>()?;

        Ok(Self { service, context })
    }
}

fn decode_segment(segment: &str) -> Result<String, LinkError> {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| LinkError::MalformedSegment(segment.to_string()))
}

fn normalize_servlet_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
