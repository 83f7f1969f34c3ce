//! Link encoding and request path decoding.
//!
//! ```text
//! /<servlet_path>/<service>/<ctx1>/<ctx2>...?sp=a&sp=b
//! ```

use tessera_types::{Link, ServicePath};

use crate::EngineError;

/// Builds links under one servlet path and decodes request paths back.
///
/// # Example
///
/// ```
/// use tessera_runtime::LinkCodec;
///
/// let codec = LinkCodec::new("/app");
/// let link = codec.link("page", vec!["Order Form".into()], Vec::new());
/// assert_eq!(link.url(None), "/app/page/Order%20Form");
///
/// let decoded = codec.decode(&link.url(None)).unwrap();
/// assert_eq!(decoded.service.as_deref(), Some("page"));
/// assert_eq!(decoded.context, vec!["Order Form"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCodec {
    servlet_path: String,
}

impl LinkCodec {
    #[must_use]
    pub fn new(servlet_path: impl Into<String>) -> Self {
        Self {
            servlet_path: servlet_path.into(),
        }
    }

    #[must_use]
    pub fn servlet_path(&self) -> &str {
        &self.servlet_path
    }

    #[must_use]
    pub fn link(&self, service: &str, context: Vec<String>, parameters: Vec<String>) -> Link {
        Link::new(&self.servlet_path, service, context, parameters)
    }

    /// Service name and context of a request path.
    ///
    /// # Errors
    ///
    /// [`EngineError::Link`] for a path outside the servlet or a malformed
    /// segment.
    pub fn decode(&self, path: &str) -> Result<ServicePath, EngineError> {
        Ok(ServicePath::decode(&self.servlet_path, path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::{service, ErrorCode};

    #[test]
    fn bare_servlet_path_has_no_service() {
        let codec = LinkCodec::new("/app");
        let decoded = codec.decode("/app").unwrap();
        assert!(decoded.service.is_none());
        assert!(decoded.context.is_empty());

        let decoded = codec.decode("/app/").unwrap();
        assert!(decoded.service.is_none());
    }

    #[test]
    fn direct_context_round_trips() {
        let codec = LinkCodec::new("/app");
        let link = codec.link(
            service::DIRECT,
            vec!["1".into(), "Home".into(), "form.email".into()],
            vec!["x/y".into()],
        );
        let decoded = codec.decode(&link.url(None)).unwrap();
        assert_eq!(decoded.context, link.context());
    }

    #[test]
    fn outside_servlet() {
        let err = LinkCodec::new("/app").decode("/other/page/Home").unwrap_err();
        assert_eq!(err.code(), "ENGINE_LINK");
    }
}
