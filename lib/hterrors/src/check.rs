//! Response checks.
//!
//! - [`check_response`] - reject a response with any [`Classifier`]
//! - [`check_status`] - reject non-2xx responses
//! - [`check_status_one_of`] - reject responses outside an allow-list
//! - [`check`] - fold a transport result and the status check together
//! - [`Checker`] - the same operations with a reusable classifier and [`CheckConfig`]
//!
//! A rejected response is consumed: its body is digested into the error
//! message, drained, and closed. An accepted response is handed back
//! untouched and its body belongs to the caller.

use std::io;

use tracing::debug;

use crate::{
    Body, CheckConfig, Classifier, DefaultClassifier, Error, OneOf, RequestError, Response,
    Result, StatusError, config::CheckConfigBuilder, extract::extract_message_with_limit,
};

// ============================================================================
// Attempt
// ============================================================================

/// What a request attempt produced: a response, or a transport error with
/// possibly a response alongside it.
///
/// `Result<Response<B>, E>` converts into an `Attempt`, so the result of a
/// transport call can be passed to [`check`] directly.
#[derive(Debug)]
pub enum Attempt<B, E> {
    /// The exchange completed.
    Received(Response<B>),
    /// The transport failed.
    Failed {
        /// The transport error.
        error: E,
        /// A response the transport returned anyway, if any.
        response: Option<Response<B>>,
    },
}

impl<B, E> Attempt<B, E> {
    /// A transport failure without a response.
    #[must_use]
    pub const fn failed(error: E) -> Self {
        Self::Failed {
            error,
            response: None,
        }
    }

    /// A transport failure that still produced a response.
    #[must_use]
    pub const fn failed_with_response(error: E, response: Response<B>) -> Self {
        Self::Failed {
            error,
            response: Some(response),
        }
    }
}

impl<B, E> From<std::result::Result<Response<B>, E>> for Attempt<B, E> {
    fn from(result: std::result::Result<Response<B>, E>) -> Self {
        match result {
            Ok(response) => Self::Received(response),
            Err(error) => Self::failed(error),
        }
    }
}

// ============================================================================
// Checker
// ============================================================================

/// Reusable response check: a classifier and a [`CheckConfig`].
///
/// # Example
///
/// ```
/// use hterrors::{Checker, Response, StatusCode};
/// use http::HeaderMap;
///
/// let checker = Checker::builder().one_of([200, 404]).body_limit(64 * 1024).build();
///
/// let response = Response::from_bytes(StatusCode::NOT_FOUND, HeaderMap::new(), "");
/// assert!(checker.check_response(response).is_ok());
///
/// let response = Response::from_bytes(StatusCode::CONFLICT, HeaderMap::new(), "duplicate key");
/// let err = checker.check_response(response).unwrap_err();
/// assert_eq!(err.to_string(), r#"<unknown method> "<unknown request>": 409 Conflict: duplicate key"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Checker<C = DefaultClassifier> {
    classifier: C,
    config: CheckConfig,
}

impl Checker {
    /// Create a checker accepting 2xx responses with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new checker builder.
    #[must_use]
    pub fn builder() -> CheckerBuilder {
        CheckerBuilder::default()
    }
}

impl<C> Checker<C> {
    /// The classifier deciding acceptance.
    #[must_use]
    pub const fn classifier(&self) -> &C {
        &self.classifier
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Hand back an accepted response, or turn a rejected one into an error.
    ///
    /// The body of a rejected response is consumed and closed.
    pub fn check_response<B>(&self, response: Response<B>) -> Result<Response<B>>
    where
        B: Body,
        C: Classifier<B>,
    {
        run(response, &self.classifier, &self.config)
    }

    /// Check the outcome of a request attempt.
    ///
    /// A transport error wins: it is returned unchanged and the body of any
    /// response that came with it is closed without being read. Otherwise
    /// the response goes through [`Checker::check_response`].
    pub fn check<B, E>(
        &self,
        attempt: impl Into<Attempt<B, E>>,
    ) -> std::result::Result<Response<B>, Error<E>>
    where
        B: Body,
        C: Classifier<B>,
    {
        match attempt.into() {
            Attempt::Received(response) => self.check_response(response).map_err(Error::Status),
            Attempt::Failed { error, response } => {
                if let Some(mut response) = response {
                    close(response.body_mut());
                }
                Err(Error::Transport(error))
            }
        }
    }
}

/// Builder for [`Checker`].
#[derive(Debug, Clone, Default)]
pub struct CheckerBuilder<C = DefaultClassifier> {
    classifier: C,
    config: CheckConfigBuilder,
}

impl<C> CheckerBuilder<C> {
    /// Use a custom classifier.
    #[must_use]
    pub fn classifier<C2>(self, classifier: C2) -> CheckerBuilder<C2> {
        CheckerBuilder {
            classifier,
            config: self.config,
        }
    }

    /// Accept only the given status codes.
    #[must_use]
    pub fn one_of(self, codes: impl IntoIterator<Item = u16>) -> CheckerBuilder<OneOf> {
        self.classifier(OneOf::new(codes))
    }

    /// Set the maximum number of body bytes read for the message.
    #[must_use]
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.config = self.config.body_limit(limit);
        self
    }

    /// Set whether rejected bodies are drained before being closed.
    #[must_use]
    pub fn drain(mut self, drain: bool) -> Self {
        self.config = self.config.drain(drain);
        self
    }

    /// Build the checker.
    #[must_use]
    pub fn build(self) -> Checker<C> {
        Checker {
            classifier: self.classifier,
            config: self.config.build(),
        }
    }
}

// ============================================================================
// Free functions
// ============================================================================

/// Reject the response if `classifier` does not accept it.
///
/// The returned error carries a digest of the body, and the body is consumed
/// and closed. An accepted response is returned untouched.
pub fn check_response<B, C>(response: Response<B>, classifier: &C) -> Result<Response<B>>
where
    B: Body,
    C: Classifier<B>,
{
    run(response, classifier, &CheckConfig::default())
}

/// Reject the response if its status is not 2xx.
///
/// Shorthand for `check_response(response, &DefaultClassifier)`.
///
/// ```
/// use hterrors::{Response, StatusCode, check_status};
/// use http::{HeaderMap, HeaderValue, header::CONTENT_TYPE};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
/// let response = Response::from_bytes(StatusCode::NOT_FOUND, headers, r#"{"status": 404, "error": "Not Found"}"#);
///
/// let err = check_status(response).unwrap_err();
/// assert_eq!(err.status_error().to_string(), "error: Not Found, status: 404");
/// ```
pub fn check_status<B: Body>(response: Response<B>) -> Result<Response<B>> {
    check_response(response, &DefaultClassifier)
}

/// Reject the response if its status is not one of `codes`.
pub fn check_status_one_of<B: Body>(
    response: Response<B>,
    codes: impl IntoIterator<Item = u16>,
) -> Result<Response<B>> {
    check_response(response, &OneOf::new(codes))
}

/// Fold a request attempt and the status check into one step.
///
/// A transport error is returned unchanged, closing the body of any response
/// that came with it. Otherwise [`check_status`] decides. On success the
/// response is returned for the caller to consume.
///
/// ```
/// use std::io;
///
/// use hterrors::{Error, Response, StatusCode, check};
/// use http::HeaderMap;
///
/// let attempt: Result<Response, io::Error> = Err(io::Error::other("connection refused"));
/// let err = check(attempt).unwrap_err();
/// assert!(err.is_transport());
///
/// let attempt: Result<Response, io::Error> =
///     Ok(Response::from_bytes(StatusCode::OK, HeaderMap::new(), "hello"));
/// assert!(check(attempt).is_ok());
/// ```
pub fn check<B, E>(attempt: impl Into<Attempt<B, E>>) -> std::result::Result<Response<B>, Error<E>>
where
    B: Body,
{
    Checker::new().check(attempt)
}

// ============================================================================
// Rejection
// ============================================================================

fn run<B, C>(response: Response<B>, classifier: &C, config: &CheckConfig) -> Result<Response<B>>
where
    B: Body,
    C: Classifier<B>,
{
    if classifier.accept(&response) {
        return Ok(response);
    }
    Err(reject(response, config))
}

fn reject<B: Body>(response: Response<B>, config: &CheckConfig) -> RequestError {
    let (status, headers, mut body, request) = response.into_parts();

    let message = extract_message_with_limit(&headers, &mut body, config.body_limit);
    if config.drain
        && let Err(err) = io::copy(&mut body, &mut io::sink())
    {
        debug!(%err, "failed to drain response body");
    }
    close(&mut body);

    let source = StatusError::new(status, message);
    let err = match request {
        Some(request) => RequestError::new(request.method().as_str(), request.target(), source),
        None => RequestError::unknown_request(source),
    };

    debug!(
        status = status.as_u16(),
        method = err.method(),
        target = err.target(),
        "response rejected"
    );
    err
}

fn close<B: Body>(body: &mut B) {
    if let Err(err) = body.close() {
        debug!(%err, "failed to close response body");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::{Cursor, Read};
    use std::rc::Rc;

    use assert2::{check, let_assert};
    use http::{HeaderMap, HeaderValue, Method, StatusCode, header::CONTENT_TYPE};
    use insta::assert_snapshot;

    use super::*;
    use crate::{RequestInfo, UNKNOWN_METHOD, UNKNOWN_REQUEST};

    /// Counts bytes read and close calls on a body.
    #[derive(Debug, Clone, Default)]
    struct Probe {
        read: Rc<Cell<usize>>,
        closed: Rc<Cell<usize>>,
    }

    #[derive(Debug)]
    struct ProbeBody {
        data: Cursor<Vec<u8>>,
        probe: Probe,
        fail_close: bool,
    }

    impl Read for ProbeBody {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            self.probe.read.set(self.probe.read.get() + n);
            Ok(n)
        }
    }

    impl Body for ProbeBody {
        fn close(&mut self) -> io::Result<()> {
            self.probe.closed.set(self.probe.closed.get() + 1);
            if self.fail_close {
                return Err(io::Error::other("close failed"));
            }
            Ok(())
        }
    }

    fn probed(status: u16, content_type: &'static str, body: &str) -> (Response<ProbeBody>, Probe) {
        let probe = Probe::default();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        let body = ProbeBody {
            data: Cursor::new(body.as_bytes().to_vec()),
            probe: probe.clone(),
            fail_close: false,
        };
        let status = StatusCode::from_u16(status).expect("valid status");
        (Response::new(status, headers, body), probe)
    }

    fn get(target: &str) -> RequestInfo {
        RequestInfo::new(Method::GET, target)
    }

    #[test]
    fn accepted_response_is_untouched() {
        let (response, probe) = probed(200, "text/plain", "payload");

        let_assert!(Ok(mut response) = check_status(response));
        check!(probe.read.get() == 0);
        check!(probe.closed.get() == 0);

        let mut body = String::new();
        response.body_mut().read_to_string(&mut body).expect("read body");
        check!(body == "payload");
    }

    #[test]
    fn rejected_json_response() {
        let (response, probe) = probed(500, "application/json", r#"{"foo":"bar","baz":"quux"}"#);
        let response = response.with_request(get("http://x/y"));

        let_assert!(Err(err) = check_status(response));
        check!(err.status() == StatusCode::INTERNAL_SERVER_ERROR);
        check!(err.method() == "GET");
        check!(err.target() == "http://x/y");
        check!(err.message() == "baz: quux, foo: bar");
        assert_snapshot!(err.to_string(), @r#"GET "http://x/y": 500 Internal Server Error: baz: quux, foo: bar"#);
        check!(probe.closed.get() == 1);
    }

    #[test]
    fn rejected_response_without_request_uses_sentinels() {
        let (response, _probe) = probed(502, "text/plain", "");

        let_assert!(Err(err) = check_status(response));
        check!(err.method() == UNKNOWN_METHOD);
        check!(err.target() == UNKNOWN_REQUEST);
        assert_snapshot!(err.to_string(), @r#"<unknown method> "<unknown request>": 502 Bad Gateway"#);
    }

    #[test]
    fn rejected_json_echoing_status_is_kept() {
        let (response, _probe) = probed(404, "application/json", r#"{"status": 404, "error": "Not Found"}"#);
        let response = response.with_request(get("http://x/missing"));

        let_assert!(Err(err) = check_status(response));
        check!(err.is_not_found());
        assert_snapshot!(err.to_string(), @r#"GET "http://x/missing": error: Not Found, status: 404"#);
    }

    #[test]
    fn rejected_unsupported_body_is_drained_and_closed() {
        let (response, probe) = probed(500, "application/octet-stream", "binary blob");

        let_assert!(Err(err) = check_status(response));
        check!(err.message().is_empty());
        check!(probe.read.get() == "binary blob".len());
        check!(probe.closed.get() == 1);
    }

    #[test]
    fn body_limit_without_drain_reads_only_the_limit() {
        let checker = Checker::builder().body_limit(5).drain(false).build();
        let (response, probe) = probed(503, "text/plain", "maintenance window");

        let_assert!(Err(err) = checker.check_response(response));
        check!(err.message() == "maint");
        check!(probe.read.get() == 5);
        check!(probe.closed.get() == 1);
    }

    #[test]
    fn body_limit_with_drain_consumes_everything() {
        let checker = Checker::builder().body_limit(5).build();
        let (response, probe) = probed(503, "text/plain", "maintenance window");

        let_assert!(Err(err) = checker.check_response(response));
        check!(err.message() == "maint");
        check!(probe.read.get() == "maintenance window".len());
    }

    #[test]
    fn close_failure_is_not_reported() {
        let (response, probe) = probed(400, "text/plain", "bad field");
        let response = response.map_body(|mut body| {
            body.fail_close = true;
            body
        });

        let_assert!(Err(err) = check_status(response));
        check!(err.to_string() == r#"<unknown method> "<unknown request>": 400 Bad Request: bad field"#);
        check!(probe.closed.get() == 1);
    }

    #[test]
    fn one_of_accepts_listed_status() {
        let (response, probe) = probed(404, "text/plain", "nothing here");

        let_assert!(Ok(_) = check_status_one_of(response, [200, 404]));
        check!(probe.read.get() == 0);
    }

    #[test]
    fn one_of_rejects_unlisted_status() {
        let (response, _probe) = probed(200, "text/plain", "surprise");

        let_assert!(Err(err) = check_status_one_of(response, [201, 204]));
        check!(err.status() == StatusCode::OK);
        check!(err.to_string().ends_with("200 OK: surprise"));
    }

    #[test]
    fn one_of_empty_rejects() {
        let (response, _probe) = probed(200, "text/plain", "");
        check!(check_status_one_of(response, []).is_err());
    }

    #[test]
    fn custom_classifier() {
        let accept_redirects =
            |response: &Response<ProbeBody>| response.is_success() || response.is_redirection();

        let (response, _probe) = probed(302, "text/html", "");
        check!(check_response(response, &accept_redirects).is_ok());

        let (response, _probe) = probed(401, "text/html", "<p>Login required</p>");
        let_assert!(Err(err) = check_response(response, &accept_redirects));
        check!(err.message() == "Login required");
    }

    #[test]
    fn checker_with_custom_classifier() {
        let checker = Checker::builder()
            .classifier(|response: &Response<ProbeBody>| response.status() != StatusCode::GONE)
            .build();

        let (response, _probe) = probed(500, "text/plain", "");
        check!(checker.check_response(response).is_ok());

        let (response, _probe) = probed(410, "text/plain", "");
        check!(checker.check_response(response).is_err());
    }

    #[test]
    fn combined_check_passes_accepted_response() {
        let (response, probe) = probed(204, "text/plain", "");

        let result: std::result::Result<_, Error<io::Error>> = check(Ok(response));
        let_assert!(Ok(response) = result);
        check!(response.status() == StatusCode::NO_CONTENT);
        check!(probe.closed.get() == 0);
    }

    #[test]
    fn combined_check_rejects_status() {
        let (response, probe) = probed(500, "text/plain", "boom");
        let response = response.with_request(get("http://x/y"));

        let result: std::result::Result<_, Error<io::Error>> = check(Ok(response));
        let_assert!(Err(Error::Status(err)) = result);
        check!(err.to_string() == r#"GET "http://x/y": 500 Internal Server Error: boom"#);
        check!(probe.closed.get() == 1);
    }

    #[test]
    fn combined_check_propagates_transport_error() {
        let attempt: std::result::Result<Response<ProbeBody>, io::Error> =
            Err(io::Error::new(io::ErrorKind::TimedOut, "deadline exceeded"));

        let_assert!(Err(Error::Transport(err)) = check(attempt));
        check!(err.kind() == io::ErrorKind::TimedOut);
        check!(err.to_string() == "deadline exceeded");
    }

    #[test]
    fn combined_check_closes_response_without_reading() {
        let (response, probe) = probed(500, "application/json", r#"{"foo":"bar"}"#);
        let attempt = Attempt::failed_with_response(io::Error::other("redirect refused"), response);

        let_assert!(Err(err) = check(attempt));
        check!(err.is_transport());
        check!(err.to_string() == "redirect refused");
        check!(probe.read.get() == 0);
        check!(probe.closed.get() == 1);
    }

    #[test]
    fn attempt_from_result() {
        let ok: std::result::Result<Response, &str> =
            Ok(Response::from_bytes(StatusCode::OK, HeaderMap::new(), ""));
        check!(matches!(Attempt::from(ok), Attempt::Received(_)));

        let err: std::result::Result<Response, &str> = Err("refused");
        let_assert!(Attempt::Failed { error, response: None } = Attempt::from(err));
        check!(error == "refused");
    }
}
