//! Message extraction from response bodies.
//!
//! The body is sniffed through its `Content-Type` and digested into a single
//! line of text:
//! - `text/plain` is returned verbatim
//! - `text/html` is converted to text and flattened
//! - `application/json` objects become `key: value` pairs sorted by key
//! - anything else yields an empty message
//!
//! Vendor types such as `application/vnd.api+json` are treated as their
//! suffix type (`application/json`).

use std::borrow::Cow;
use std::io::Read;
use std::sync::LazyLock;

use html2text::render::TrivialDecorator;
use http::HeaderMap;
use http::header::CONTENT_TYPE;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, trace};

// Both patterns are literals known to compile.
#[allow(clippy::expect_used)]
static NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\r?\n)+").expect("pattern"));
#[allow(clippy::expect_used)]
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s\s+").expect("pattern"));

const DEFAULT_MEDIA_TYPE: &str = "text/plain";
/// Wrap width for rendered HTML; long enough that paragraphs stay on one line.
const HTML_WIDTH: usize = 10_000;
const VENDOR_PREFIX: &str = "application/vnd.";

// ============================================================================
// Content Type
// ============================================================================

/// Body formats the extractor knows how to digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// Plain text (`text/plain`), also used when the header is missing or malformed.
    PlainText,
    /// HTML (`text/html`).
    Html,
    /// JSON (`application/json` and `application/vnd.*+json`).
    Json,
    /// Anything else; no message is extracted.
    Unsupported,
}

impl ContentType {
    /// Sniff the content type from response headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_media_type(&media_type(headers))
    }

    /// Classify a normalized base media type.
    #[must_use]
    pub fn from_media_type(media_type: &str) -> Self {
        match media_type {
            "text/plain" => Self::PlainText,
            "text/html" => Self::Html,
            "application/json" => Self::Json,
            _ => Self::Unsupported,
        }
    }

    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Html => "text/html",
            Self::Json => "application/json",
            Self::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Base media type of the response, parameters stripped and vendor types
/// normalized.
///
/// A missing or unparseable `Content-Type` is treated as `text/plain`.
///
/// ```
/// use http::{HeaderMap, HeaderValue, header::CONTENT_TYPE};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/vnd.api+json; charset=utf-8"));
/// assert_eq!(hterrors::media_type(&headers), "application/json");
///
/// assert_eq!(hterrors::media_type(&HeaderMap::new()), "text/plain");
/// ```
#[must_use]
pub fn media_type(headers: &HeaderMap) -> String {
    let base = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .map_or_else(
            || DEFAULT_MEDIA_TYPE.to_string(),
            |mime| mime.essence_str().to_string(),
        );

    normalize_vendor(base)
}

/// `application/vnd.<vendor>+<subtype>` becomes `application/<subtype>`,
/// splitting on the first `+`.
fn normalize_vendor(media_type: String) -> String {
    if media_type.starts_with(VENDOR_PREFIX)
        && let Some((_, subtype)) = media_type.split_once('+')
    {
        return format!("application/{subtype}");
    }
    media_type
}

// ============================================================================
// Extraction
// ============================================================================

/// Extract a one-line diagnostic message from a response body.
///
/// Reads the whole body for the supported formats and nothing for the
/// others. Read failures are not reported: whatever was read is used.
///
/// ```
/// use http::{HeaderMap, HeaderValue, header::CONTENT_TYPE};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
///
/// let mut body = br#"{"foo": "bar", "baz": "quux"}"#.as_slice();
/// assert_eq!(hterrors::extract_message(&headers, &mut body), "baz: quux, foo: bar");
/// ```
pub fn extract_message<R: Read>(headers: &HeaderMap, body: &mut R) -> String {
    extract_message_with_limit(headers, body, None)
}

/// Same as [`extract_message`], reading at most `limit` bytes of the body.
///
/// Unread bytes stay in the body.
pub fn extract_message_with_limit<R: Read>(
    headers: &HeaderMap,
    body: &mut R,
    limit: Option<usize>,
) -> String {
    let content_type = ContentType::from_headers(headers);
    trace!(%content_type, "extracting message from response body");

    match content_type {
        ContentType::PlainText => String::from_utf8_lossy(&read_body(body, limit)).into_owned(),
        ContentType::Html => html_digest(&String::from_utf8_lossy(&read_body(body, limit))),
        ContentType::Json => json_digest(&read_body(body, limit)),
        ContentType::Unsupported => String::new(),
    }
}

fn read_body<R: Read>(body: &mut R, limit: Option<usize>) -> Vec<u8> {
    let mut bytes = Vec::new();
    let result = match limit {
        Some(limit) => body
            .by_ref()
            .take(u64::try_from(limit).unwrap_or(u64::MAX))
            .read_to_end(&mut bytes),
        None => body.read_to_end(&mut bytes),
    };

    if let Err(err) = result {
        debug!(%err, read = bytes.len(), "failed to read response body");
    }
    bytes
}

/// Render HTML as bare text: no heading, list, link or emphasis markers.
fn html_digest(html: &str) -> String {
    let text = html2text::config::with_decorator(TrivialDecorator::new())
        .no_table_borders()
        .allow_width_overflow()
        .string_from_read(html.as_bytes(), HTML_WIDTH)
        .unwrap_or_else(|err| {
            debug!(%err, "HTML conversion failed, using raw body");
            html.to_string()
        });
    flatten(&text)
}

/// Trim, turn newline runs into `": "`, then squeeze whitespace runs.
fn flatten(text: &str) -> String {
    let joined = NEWLINES.replace_all(text.trim(), ": ");
    SPACES.replace_all(&joined, " ").into_owned()
}

fn json_digest(bytes: &[u8]) -> String {
    let mut values =
        serde_json::Deserializer::from_slice(bytes).into_iter::<Option<Map<String, Value>>>();
    let doc = match values.next() {
        Some(Ok(Some(doc))) => doc,
        Some(Ok(None)) => return String::new(),
        Some(Err(err)) => return invalid_json(&err),
        None => return invalid_json(&"EOF while parsing a value"),
    };

    let mut fields: Vec<_> = doc.iter().collect();
    fields.sort_unstable_by(|(left, _), (right, _)| left.cmp(right));

    fields
        .into_iter()
        .map(|(key, value)| format!("{key}: {}", render_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn invalid_json(err: &dyn std::fmt::Display) -> String {
    format!("<invalid json in response body: {err}>")
}

fn render_value(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}
