//! HTTP response abstraction for the profiler and the wrapped application.

use bytes::Bytes;
use http::header::{self, HeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};

/// Common header name constants for fast lookup.
mod header_names {
    use super::*;
    pub static CONTENT_TYPE: HeaderName = header::CONTENT_TYPE;
    pub static CONTENT_LENGTH: HeaderName = header::CONTENT_LENGTH;
    pub static CONTENT_DISPOSITION: HeaderName = header::CONTENT_DISPOSITION;
}

/// Pre-allocated static header values for common content types.
mod content_types {
    use super::*;
    pub static TEXT_PLAIN: HeaderValue = HeaderValue::from_static("text/plain");
}

/// HTTP response.
///
/// Note: Clone is intentionally not derived to prevent expensive copies.
/// Use references or move semantics instead.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Create a new response builder.
    #[inline]
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    /// Create a 200 OK response with body.
    #[inline]
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Create a plain-text response with the given status.
    #[inline]
    pub fn text(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::builder().status(status).text().body(body).build()
    }

    /// Create a 500 Internal Server Error response.
    #[inline]
    pub fn internal_error(msg: &str) -> Self {
        Self::text(
            StatusCode::INTERNAL_SERVER_ERROR,
            Bytes::copy_from_slice(msg.as_bytes()),
        )
    }

    /// Get the status code.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the response body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get a header value by HeaderName (fast path).
    #[inline]
    fn header_by_name(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get a header value by string name (slower, case-insensitive).
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get Content-Type header (fast path).
    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.header_by_name(&header_names::CONTENT_TYPE)
    }

    /// Get Content-Length header.
    #[inline]
    pub fn content_length(&self) -> Option<u64> {
        self.header_by_name(&header_names::CONTENT_LENGTH)
            .and_then(|v| v.parse().ok())
    }

    /// Get Content-Disposition header.
    #[inline]
    pub fn content_disposition(&self) -> Option<&str> {
        self.header_by_name(&header_names::CONTENT_DISPOSITION)
    }

    /// Get body length.
    #[inline]
    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}

impl From<Response> for http::Response<Bytes> {
    fn from(res: Response) -> Self {
        let mut http_res = http::Response::new(res.body);
        *http_res.status_mut() = res.status;
        *http_res.headers_mut() = res.headers;
        http_res
    }
}

/// Builder for creating HTTP responses.
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Option<HeaderMap>, // Lazy allocation
    body: Bytes,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBuilder {
    /// Create a new response builder.
    #[inline]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: None, // Don't allocate until needed
            body: Bytes::new(),
        }
    }

    /// Set the status code.
    #[inline]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add header with typed HeaderName and HeaderValue (zero-alloc for static values).
    #[inline]
    pub fn header_value(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers
            .get_or_insert_with(HeaderMap::new)
            .insert(name, value);
        self
    }

    /// Add header by strings.
    #[inline]
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers
                .get_or_insert_with(HeaderMap::new)
                .insert(name, value);
        }
        self
    }

    /// Set the body.
    #[inline]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set Content-Type header (generic).
    #[inline]
    pub fn content_type(self, content_type: &str) -> Self {
        self.header("content-type", content_type)
    }

    /// Set Content-Disposition header.
    #[inline]
    pub fn content_disposition(self, disposition: &str) -> Self {
        self.header("content-disposition", disposition)
    }

    /// Set Content-Type to text/plain (uses static HeaderValue).
    #[inline]
    pub fn text(self) -> Self {
        self.header_value(
            header_names::CONTENT_TYPE.clone(),
            content_types::TEXT_PLAIN.clone(),
        )
    }

    /// Build the response.
    #[inline]
    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers.unwrap_or_default(),
            body: self.body,
        }
    }

    /// Build the response with a Content-Length header matching the body.
    #[inline]
    pub fn build_with_length(self) -> Response {
        let len = HeaderValue::from(self.body.len());
        self.header_value(header_names::CONTENT_LENGTH.clone(), len)
            .build()
    }
}
