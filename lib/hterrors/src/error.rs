//! Error types for hterrors.

use std::fmt;

use derive_more::{Display, Error};
use http::StatusCode;

/// Method reported when the originating request is unknown.
pub const UNKNOWN_METHOD: &str = "<unknown method>";

/// Target reported when the originating request is unknown.
pub const UNKNOWN_REQUEST: &str = "<unknown request>";

// ============================================================================
// Status Error
// ============================================================================

/// A rejected status code and the message the server sent with it.
///
/// Renders as `<code> <reason>: <message>`, `<code> <reason>` when the message
/// is empty, or the bare message when it already mentions both the code and
/// the reason phrase.
///
/// ```
/// use hterrors::{StatusCode, StatusError};
///
/// let err = StatusError::new(StatusCode::BAD_REQUEST, "bad field");
/// assert_eq!(err.to_string(), "400 Bad Request: bad field");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct StatusError {
    status: StatusCode,
    message: String,
}

impl StatusError {
    /// Create a status error from status code and message.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Message extracted from the response body, possibly empty.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.status.as_str();
        let text = self.status.canonical_reason().unwrap_or_default();

        if self.message.contains(code) && self.message.contains(text) {
            f.write_str(&self.message)
        } else if self.message.is_empty() {
            write!(f, "{code} {text}")
        } else {
            write!(f, "{code} {text}: {}", self.message)
        }
    }
}

// ============================================================================
// Request Error
// ============================================================================

/// A [`StatusError`] with the method and target of the request that got it.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("{method} {target:?}: {source}")]
pub struct RequestError {
    method: String,
    target: String,
    source: StatusError,
}

impl RequestError {
    /// Wrap a status error with request context.
    #[must_use]
    pub fn new(method: impl Into<String>, target: impl Into<String>, source: StatusError) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            source,
        }
    }

    /// Wrap a status error for a response whose request is unknown.
    #[must_use]
    pub fn unknown_request(source: StatusError) -> Self {
        Self::new(UNKNOWN_METHOD, UNKNOWN_REQUEST, source)
    }

    /// Request method, or [`UNKNOWN_METHOD`].
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request target, or [`UNKNOWN_REQUEST`].
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The wrapped status error.
    #[must_use]
    pub const fn status_error(&self) -> &StatusError {
        &self.source
    }

    /// Consume into the wrapped status error.
    #[must_use]
    pub fn into_status_error(self) -> StatusError {
        self.source
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.source.status
    }

    /// Message extracted from the response body.
    #[must_use]
    pub fn message(&self) -> &str {
        self.source.message()
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.source.is_client_error()
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.source.is_server_error()
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.source.is_not_found()
    }
}

/// Result type alias using [`RequestError`] by default.
pub type Result<T, E = RequestError> = std::result::Result<T, E>;

// ============================================================================
// Combined Error
// ============================================================================

/// Outcome of [`check`](crate::check): either the transport failed, or the
/// response was rejected.
///
/// Both variants render and chain exactly like the error they hold.
#[derive(Debug)]
pub enum Error<E> {
    /// The transport error, unchanged.
    Transport(E),
    /// The response was rejected.
    Status(RequestError),
}

impl<E> Error<E> {
    /// Returns `true` if the transport failed.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` if the response was rejected.
    #[must_use]
    pub const fn is_status(&self) -> bool {
        matches!(self, Self::Status(_))
    }

    /// Returns the HTTP status code if the response was rejected.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(err) => Some(err.status()),
            Self::Transport(_) => None,
        }
    }

    /// The rejection, if any.
    #[must_use]
    pub const fn as_status(&self) -> Option<&RequestError> {
        match self {
            Self::Status(err) => Some(err),
            Self::Transport(_) => None,
        }
    }

    /// Consume into the transport error, if any.
    #[must_use]
    pub fn into_transport(self) -> Option<E> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Status(_) => None,
        }
    }
}

impl<E> From<RequestError> for Error<E> {
    fn from(err: RequestError) -> Self {
        Self::Status(err)
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => fmt::Display::fmt(err, f),
            Self::Status(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl<E: std::error::Error> std::error::Error for Error<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => std::error::Error::source(err),
            Self::Status(err) => std::error::Error::source(err),
        }
    }
}
