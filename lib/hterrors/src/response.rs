//! Received HTTP responses.
//!
//! [`Response`] is what the transport hands over once an exchange completed:
//! status, headers, a single-use [`Body`], and, when known, the
//! [`RequestInfo`] of the request that produced it.
//!
//! # Example
//!
//! ```
//! use hterrors::{RequestInfo, Response, StatusCode};
//! use http::{HeaderMap, Method};
//!
//! let response = Response::from_bytes(StatusCode::NOT_FOUND, HeaderMap::new(), "gone")
//!     .with_request(RequestInfo::new(Method::GET, "https://api.example.com/users/42"));
//!
//! assert!(response.is_client_error());
//! assert_eq!(response.request().map(RequestInfo::target), Some("https://api.example.com/users/42"));
//! ```

use std::io::{self, Cursor, Read};

use bytes::Bytes;
use derive_more::Display;
use http::{HeaderMap, Method, StatusCode};

// ============================================================================
// Body
// ============================================================================

/// A single-use response body.
///
/// The body is read at most once and closed exactly once, by whichever code
/// path ends up owning the [`Response`].
pub trait Body: Read {
    /// Release the resources held by the body.
    ///
    /// In-memory bodies have nothing to release.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying resource fails to close.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: AsRef<[u8]>> Body for Cursor<T> {}

impl Body for &[u8] {}

impl Body for io::Empty {}

impl<B: Body + ?Sized> Body for Box<B> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

// ============================================================================
// Request Info
// ============================================================================

/// Method and target of the request a response answers.
///
/// Store it in the extensions of an [`http::Response`] to have it picked up by
/// `Response::from`.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{method} {target}")]
pub struct RequestInfo {
    method: Method,
    target: String,
}

impl RequestInfo {
    /// Creates a new request descriptor.
    #[must_use]
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
        }
    }

    /// Creates a request descriptor from a parsed URL.
    #[must_use]
    pub fn from_url(method: Method, url: &url::Url) -> Self {
        Self::new(method, url.as_str())
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Request target, usually the full URL.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

// ============================================================================
// Response
// ============================================================================

/// HTTP response with status, headers, body, and originating request.
#[derive(Debug, Clone)]
pub struct Response<B = Cursor<Bytes>> {
    status: StatusCode,
    headers: HeaderMap,
    body: B,
    request: Option<RequestInfo>,
}

impl Response {
    /// Creates a response with an in-memory body.
    #[must_use]
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self::new(status, headers, Cursor::new(body.into()))
    }
}

impl<B> Response<B> {
    /// Creates a new response without request information.
    #[must_use]
    pub const fn new(status: StatusCode, headers: HeaderMap, body: B) -> Self {
        Self {
            status,
            headers,
            body,
            request: None,
        }
    }

    /// Attach the originating request.
    #[must_use]
    pub fn with_request(mut self, request: RequestInfo) -> Self {
        self.request = Some(request);
        self
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Single header value by name, case-insensitive.
    ///
    /// Values that are not visible ASCII are reported as absent.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Originating request, if the transport recorded one.
    #[must_use]
    pub const fn request(&self) -> Option<&RequestInfo> {
        self.request.as_ref()
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Mutable access to the body.
    #[must_use]
    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Consume into (status, headers, body, request).
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, B, Option<RequestInfo>) {
        (self.status, self.headers, self.body, self.request)
    }

    /// Status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Status is 3xx.
    #[must_use]
    pub fn is_redirection(&self) -> bool {
        self.status.is_redirection()
    }

    /// Status is 4xx.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Status is 5xx.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Transform the body with a function.
    pub fn map_body<F, B2>(self, f: F) -> Response<B2>
    where
        F: FnOnce(B) -> B2,
    {
        Response {
            status: self.status,
            headers: self.headers,
            body: f(self.body),
            request: self.request,
        }
    }
}

impl<B> From<http::Response<B>> for Response<B> {
    fn from(response: http::Response<B>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            request: parts.extensions.get::<RequestInfo>().cloned(),
            headers: parts.headers,
            body,
        }
    }
}
