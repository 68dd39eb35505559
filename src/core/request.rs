//! HTTP request abstraction for the profiler and the wrapped application.

use bytes::Bytes;
use http::header::HeaderName;
use http::uri::PathAndQuery;
use http::{HeaderMap, Method, Uri};

use super::Result;

/// Lazily initialized custom header names.
static X_REQUEST_ID: std::sync::LazyLock<HeaderName> =
    std::sync::LazyLock::new(|| HeaderName::from_static("x-request-id"));

/// HTTP request.
///
/// Note: Clone is intentionally not derived. Use [`Request::fork`] when the
/// same request has to be delivered more than once.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Get the HTTP method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the request path.
    #[inline]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Get the query string.
    ///
    /// `Some("")` for a URI ending in a bare `?`, `None` when there is no
    /// query component at all.
    #[inline]
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Get the full URI.
    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Get the headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a mutable reference to headers.
    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Get the request body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get a header value by string name (case-insensitive).
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get X-Request-ID header.
    #[inline]
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get(&*X_REQUEST_ID).and_then(|v| v.to_str().ok())
    }

    /// Replace the query component, keeping path, scheme and authority.
    ///
    /// The query is always present afterwards: an empty `query` yields a URI
    /// ending in `?`.
    pub fn with_query(mut self, query: &str) -> Result<Self> {
        let path_and_query = PathAndQuery::try_from(format!("{}?{}", self.path(), query))?;

        let mut parts = self.uri.into_parts();
        parts.path_and_query = Some(path_and_query);
        self.uri = Uri::from_parts(parts)?;
        Ok(self)
    }

    /// Make an independent copy of this request (the body buffer is shared).
    pub fn fork(&self) -> Self {
        Self {
            method: self.method.clone(),
            uri: self.uri.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

impl<B> From<http::Request<B>> for Request
where
    B: Into<Bytes>,
{
    fn from(req: http::Request<B>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: body.into(),
        }
    }
}
