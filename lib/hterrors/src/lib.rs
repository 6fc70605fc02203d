//! Readable errors for non-success HTTP responses.
//!
//! Hand a received [`Response`] to [`check_status`] (or one of its siblings)
//! and get back either the response, or a [`RequestError`] whose message is a
//! one-line digest of the body:
//!
//! ```
//! use hterrors::{RequestInfo, Response, StatusCode, check_status};
//! use http::{HeaderMap, HeaderValue, Method, header::CONTENT_TYPE};
//!
//! let mut headers = HeaderMap::new();
//! headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
//!
//! let response = Response::from_bytes(
//!     StatusCode::UNPROCESSABLE_ENTITY,
//!     headers,
//!     r#"{"field": "email", "reason": "already taken"}"#,
//! )
//! .with_request(RequestInfo::new(Method::POST, "https://api.example.com/users"));
//!
//! let err = check_status(response).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     r#"POST "https://api.example.com/users": 422 Unprocessable Entity: field: email, reason: already taken"#
//! );
//! ```
//!
//! The crate provides:
//! - [`Response`], [`Body`] and [`RequestInfo`] - what the transport hands over
//! - [`Classifier`], [`DefaultClassifier`] and [`OneOf`] - acceptance predicates
//! - [`extract_message`] and [`ContentType`] - body digests
//! - [`StatusError`], [`RequestError`] and [`Error`] - error values
//! - [`check_response`], [`check_status`], [`check_status_one_of`], [`check`] and [`Checker`]
//! - [`StatusCode`] and [`header`] - re-exported from the `http` crate

mod check;
mod classifier;
mod config;
mod error;
mod extract;
pub mod prelude;
mod response;

pub use check::{
    Attempt, Checker, CheckerBuilder, check, check_response, check_status, check_status_one_of,
};
pub use classifier::{Classifier, DefaultClassifier, OneOf};
pub use config::{CheckConfig, CheckConfigBuilder};
pub use error::{Error, RequestError, Result, StatusError, UNKNOWN_METHOD, UNKNOWN_REQUEST};
pub use extract::{ContentType, extract_message, extract_message_with_limit, media_type};
pub use response::{Body, RequestInfo, Response};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
