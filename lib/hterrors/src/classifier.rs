//! Response classifiers.
//!
//! A [`Classifier`] decides whether a [`Response`] counts as a success.
//! Classifiers only look at the status and headers, never at the body.
//!
//! Any closure `Fn(&Response<B>) -> bool` is a classifier:
//!
//! ```
//! use hterrors::{Classifier, Response, StatusCode};
//! use http::HeaderMap;
//!
//! let accept_redirects = |response: &Response| response.is_success() || response.is_redirection();
//!
//! let response = Response::from_bytes(StatusCode::FOUND, HeaderMap::new(), "");
//! assert!(accept_redirects.accept(&response));
//! ```

use std::collections::BTreeSet;

use crate::Response;

/// Trait for deciding whether a response is accepted.
pub trait Classifier<B> {
    /// Returns `true` if the response is a success.
    fn accept(&self, response: &Response<B>) -> bool;
}

impl<B, F> Classifier<B> for F
where
    F: Fn(&Response<B>) -> bool,
{
    fn accept(&self, response: &Response<B>) -> bool {
        self(response)
    }
}

/// Default classifier: accepts every 2xx status.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl<B> Classifier<B> for DefaultClassifier {
    fn accept(&self, response: &Response<B>) -> bool {
        (200..300).contains(&response.status().as_u16())
    }
}

/// Allow-list classifier: accepts only the listed status codes.
///
/// Duplicates collapse and order is irrelevant. An empty list rejects
/// everything.
///
/// ```
/// use hterrors::OneOf;
///
/// let expected: OneOf = [200, 204, 200].into_iter().collect();
/// assert_eq!(expected.codes().collect::<Vec<_>>(), vec![200, 204]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OneOf {
    codes: BTreeSet<u16>,
}

impl OneOf {
    /// Creates an allow-list from status codes.
    #[must_use]
    pub fn new(codes: impl IntoIterator<Item = u16>) -> Self {
        codes.into_iter().collect()
    }

    /// Returns `true` if the code is in the list.
    #[must_use]
    pub fn contains(&self, code: u16) -> bool {
        self.codes.contains(&code)
    }

    /// Accepted codes, ascending.
    pub fn codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.codes.iter().copied()
    }

    /// Returns `true` if no code is accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl FromIterator<u16> for OneOf {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().collect(),
        }
    }
}

impl<B> Classifier<B> for OneOf {
    fn accept(&self, response: &Response<B>) -> bool {
        self.contains(response.status().as_u16())
    }
}
