//! Host-facing request and response values.
//!
//! The host decodes HTTP into a [`WebRequest`] and writes the returned
//! [`WebResponse`] back out. Nothing here knows about sockets.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tessera_types::{Locale, SERVICE_PARAMETER};

use crate::multipart::MultipartBody;
use crate::EngineError;

/// Session as seen by the host at request start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No session exists.
    #[default]
    None,
    /// The session was created by this request.
    New,
    /// The session existed before this request.
    Established,
}

/// A cookie to set on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    /// Lifetime in seconds; `None` for a session cookie.
    pub max_age: Option<u64>,
}

impl Cookie {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            max_age: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }
}

/// An inbound request.
///
/// # Example
///
/// ```
/// use tessera_runtime::{SessionState, WebRequest};
///
/// let request = WebRequest::from_url("/app/direct/1/Home/pick?sp=42&sp=a+b&q=x")
///     .unwrap()
///     .with_session(SessionState::Established);
///
/// assert_eq!(request.path(), "/app/direct/1/Home/pick");
/// assert_eq!(request.service_parameters(), vec!["42", "a b"]);
/// assert_eq!(request.query_values("q"), vec!["x"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WebRequest {
    path: String,
    query: Vec<(String, String)>,
    cookies: HashMap<String, String>,
    session: SessionState,
    preferred_locale: Option<Locale>,
    multipart: Option<MultipartBody>,
}

impl WebRequest {
    /// A request for `path` with no query.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parses a request URL: path plus optional query string.
    ///
    /// Query names and values are percent-decoded and `+` is read as a
    /// space. A fragment is ignored.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidParameter`] for malformed percent-encoding.
    pub fn from_url(url: &str) -> Result<Self, EngineError> {
        let url = url.split('#').next().unwrap_or_default();
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };

        let mut request = Self::new(path);
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let name = decode_component(name, name)?;
            let value = decode_component(&name, value)?;
            request.query.push((name, value));
        }
        Ok(request)
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: SessionState) -> Self {
        self.session = session;
        self
    }

    /// Locale the client prefers, typically from `Accept-Language`.
    #[must_use]
    pub fn with_preferred_locale(mut self, locale: Locale) -> Self {
        self.preferred_locale = Some(locale);
        self
    }

    #[must_use]
    pub fn with_multipart(mut self, body: MultipartBody) -> Self {
        self.multipart = Some(body);
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query pairs in request order.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    #[must_use]
    pub fn query_values(&self, name: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Values of the repeated `sp` parameter.
    #[must_use]
    pub fn service_parameters(&self) -> Vec<String> {
        self.query_values(SERVICE_PARAMETER)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn session(&self) -> SessionState {
        self.session
    }

    /// Whether a session existed before this request.
    #[must_use]
    pub fn has_established_session(&self) -> bool {
        self.session == SessionState::Established
    }

    #[must_use]
    pub fn preferred_locale(&self) -> Option<&Locale> {
        self.preferred_locale.as_ref()
    }

    pub(crate) fn take_multipart(&mut self) -> Option<MultipartBody> {
        self.multipart.take()
    }
}

fn decode_component(name: &str, raw: &str) -> Result<String, EngineError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| EngineError::InvalidParameter {
            name: name.to_string(),
            message: e.to_string(),
        })
}

/// Content type of rendered pages.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// An outbound response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
    pub cookies: Vec<Cookie>,
    /// Redirect target for 3xx responses.
    pub location: Option<String>,
}

impl WebResponse {
    /// A `200` HTML response.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: HTML_CONTENT_TYPE.to_string(),
            body: body.into(),
            cookies: Vec::new(),
            location: None,
        }
    }

    /// A `302` redirect to `location`.
    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 302,
            content_type: HTML_CONTENT_TYPE.to_string(),
            body: String::new(),
            cookies: Vec::new(),
            location: Some(location.into()),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    #[must_use]
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::ErrorCode;

    #[test]
    fn parses_query_pairs_in_order() {
        let request = WebRequest::from_url("/app/page/Home?a=1&b=two%20words&a=3&flag#top").unwrap();

        assert_eq!(request.path(), "/app/page/Home");
        assert_eq!(request.query_values("a"), vec!["1", "3"]);
        assert_eq!(request.query_values("b"), vec!["two words"]);
        assert_eq!(request.query_values("flag"), vec![""]);
        assert!(request.query_values("missing").is_empty());
    }

    #[test]
    fn bad_escape_is_validation_error() {
        let err = WebRequest::from_url("/app?name=%ff%fe").unwrap_err();
        assert_eq!(err.code(), "ENGINE_INVALID_PARAMETER");
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn session_defaults_to_none() {
        let request = WebRequest::new("/app");
        assert_eq!(request.session(), SessionState::None);
        assert!(!request.has_established_session());
        assert!(request.clone().with_session(SessionState::Established).has_established_session());
    }

    #[test]
    fn responses() {
        let page = WebResponse::html("<p>hi</p>");
        assert_eq!(page.status, 200);
        assert!(!page.is_redirect());

        let moved = WebResponse::redirect("/app/page/StaleSession");
        assert_eq!(moved.status, 302);
        assert!(moved.is_redirect());
        assert_eq!(moved.location.as_deref(), Some("/app/page/StaleSession"));

        let failed = WebResponse::html("oops").with_status(500);
        assert_eq!(failed.status, 500);
    }

    #[test]
    fn response_serializes() {
        let response = WebResponse::html("x").with_cookie(Cookie::new("tessera-locale", "fr").with_path("/app"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["cookies"][0]["value"], "fr");
        assert_eq!(json["status"], 200);
    }
}
