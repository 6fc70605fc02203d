//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use hterrors::prelude::*;
//! ```

pub use crate::{
    Attempt, Body, Checker, Classifier, DefaultClassifier, Error, OneOf, RequestError,
    RequestInfo, Response, StatusError, check, check_response, check_status, check_status_one_of,
};
