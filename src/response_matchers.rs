//! Matchers over HTTP responses returned by a document service.
//!
//! Any response type can be tested by implementing [`HttpResponse`]; it is
//! implemented for [`http::Response`] with any byte body.
//!
//! ```
//! use formmatchers::{assert_that, contains_string};
//! use formmatchers::response_matchers::*;
//! use http::StatusCode;
//!
//! let response = http::Response::builder()
//!     .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
//!     .body("hello world")
//!     .unwrap();
//!
//! assert_that(&response, is_status(StatusCode::OK));
//! assert_that(&response, has_media_type("text/plain"));
//! assert_that(&response, has_string_entity_matching(contains_string("world")));
//! ```

use crate::{check, equal_to, Description, HtmlForm, Matcher, Pdf, Result};
use encoding_rs::{Encoding, UTF_8};
use http::header::CONTENT_TYPE;
use http::StatusCode;
use std::cell::RefCell;
use std::io;
use tracing::debug;

pub const APPLICATION_PDF: &str = "application/pdf";
pub const TEXT_HTML: &str = "text/html";

// ── Response ─────────────────────────────────────────────────────────────────

/// The parts of an HTTP response the matchers look at.
pub trait HttpResponse {
    fn status(&self) -> StatusCode;

    /// The `Content-Type` header value, if any.
    fn media_type(&self) -> Option<&str>;

    fn has_entity(&self) -> bool;

    /// Read the whole response body.
    fn read_entity(&self) -> io::Result<Vec<u8>>;
}

/// An empty body counts as no entity.
impl<B: AsRef<[u8]>> HttpResponse for http::Response<B> {
    fn status(&self) -> StatusCode {
        http::Response::status(self)
    }

    fn media_type(&self) -> Option<&str> {
        self.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    fn has_entity(&self) -> bool {
        !self.body().as_ref().is_empty()
    }

    fn read_entity(&self) -> io::Result<Vec<u8>> {
        Ok(self.body().as_ref().to_vec())
    }
}

/// `"Not Found (404)"`; codes without a registered reason read `"Unknown"`.
fn status_text(status: StatusCode) -> String {
    format!(
        "{} ({})",
        status.canonical_reason().unwrap_or("Unknown"),
        status.as_u16()
    )
}

// ── Media types ──────────────────────────────────────────────────────────────

/// `type/subtype`, lower-cased, parameters dropped.
fn parse_media_type(media_type: &str) -> (String, String) {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    let (ty, subtype) = essence.split_once('/').unwrap_or((essence, "*"));
    (ty.trim().to_ascii_lowercase(), subtype.trim().to_ascii_lowercase())
}

/// Two media types are compatible when their types and subtypes are equal
/// or either side is the `*` wildcard.
pub fn media_types_compatible(expected: &str, actual: &str) -> bool {
    let (expected_type, expected_subtype) = parse_media_type(expected);
    let (actual_type, actual_subtype) = parse_media_type(actual);
    let wildcard = |a: &str, b: &str| a == "*" || b == "*" || a == b;
    wildcard(&expected_type, &actual_type)
        && (expected_type == "*" || actual_type == "*" || wildcard(&expected_subtype, &actual_subtype))
}

// ── Status, media type, entity presence ──────────────────────────────────────

struct IsStatus(StatusCode);

impl<R: HttpResponse + ?Sized> Matcher<R> for IsStatus {
    fn describe_to(&self, description: &mut Description) {
        description
            .append_text("Response HTTP status code should be ")
            .append_text(&status_text(self.0));
    }

    fn matches(&self, item: &R, mismatch: &mut Description) -> bool {
        let actual = item.status();
        let result = actual == self.0;
        if !result {
            mismatch
                .append_text("Response HTTP status code was ")
                .append_text(&status_text(actual));
        }
        result
    }
}

pub fn is_status<R: HttpResponse + ?Sized>(status: StatusCode) -> impl Matcher<R> {
    IsStatus(status)
}

struct HasMediaType(String);

impl<R: HttpResponse + ?Sized> Matcher<R> for HasMediaType {
    fn describe_to(&self, description: &mut Description) {
        description
            .append_text("Response MediaType should be '")
            .append_text(&self.0)
            .append_text("'");
    }

    fn matches(&self, item: &R, mismatch: &mut Description) -> bool {
        let actual = item.media_type();
        let result = actual.is_some_and(|mt| media_types_compatible(&self.0, mt));
        if !result {
            mismatch
                .append_text("Response MediaType was '")
                .append_text(actual.unwrap_or("null"))
                .append_text("'.");
        }
        result
    }
}

/// Matches a response whose media type is compatible with `media_type`.
pub fn has_media_type<R: HttpResponse + ?Sized>(media_type: &str) -> impl Matcher<R> {
    HasMediaType(media_type.to_string())
}

struct HasEntity(bool);

impl<R: HttpResponse + ?Sized> Matcher<R> for HasEntity {
    fn describe_to(&self, description: &mut Description) {
        description
            .append_text("Response should ")
            .append_text(if self.0 { "" } else { "not " })
            .append_text("have an entity.");
    }

    fn matches(&self, item: &R, mismatch: &mut Description) -> bool {
        let actual = item.has_entity();
        if actual != self.0 {
            mismatch
                .append_text("Response did ")
                .append_text(if actual { "" } else { "not " })
                .append_text("have an entity.");
        }
        actual == self.0
    }
}

pub fn has_entity<R: HttpResponse + ?Sized>() -> impl Matcher<R> {
    HasEntity(true)
}

pub fn does_not_have_entity<R: HttpResponse + ?Sized>() -> impl Matcher<R> {
    HasEntity(false)
}

// ── Entity contents ──────────────────────────────────────────────────────────

/// Applies a sub-matcher to the response body. The body is read on first
/// use and cached, so a one-shot stream is only consumed once.
struct EntityMatching<M, F, V> {
    sub_matcher: M,
    convert: F,
    entity: RefCell<Option<V>>,
}

impl<M, F, V> EntityMatching<M, F, V>
where
    F: Fn(Vec<u8>) -> V,
{
    fn new(sub_matcher: M, convert: F) -> Self {
        Self {
            sub_matcher,
            convert,
            entity: RefCell::new(None),
        }
    }
}

impl<R, M, F, V, T> Matcher<R> for EntityMatching<M, F, V>
where
    R: HttpResponse + ?Sized,
    F: Fn(Vec<u8>) -> V,
    V: std::ops::Deref<Target = T>,
    T: ?Sized,
    M: Matcher<T>,
{
    fn describe_to(&self, description: &mut Description) {
        description.append_text("Response entity ");
        self.sub_matcher.describe_to(description);
    }

    fn matches(&self, item: &R, mismatch: &mut Description) -> bool {
        if self.entity.borrow().is_none() {
            if !item.has_entity() {
                mismatch.append_text("Response did not have an entity.");
                return false;
            }
            let bytes = item
                .read_entity()
                .unwrap_or_else(|e| panic!("Exception while reading response stream: {e}"));
            debug!(len = bytes.len(), "read response entity");
            *self.entity.borrow_mut() = Some((self.convert)(bytes));
        }

        let entity = self.entity.borrow();
        let Some(ref value) = *entity else {
            return false;
        };
        let mut inner = Description::new();
        let result = self.sub_matcher.matches(&**value, &mut inner);
        if !result {
            mismatch.append_text("Response entity ").append_text(inner.as_str());
        }
        result
    }
}

/// Matches the response body bytes with `byte_matcher`. Fails if the
/// response has no entity.
pub fn has_entity_matching<R, M>(byte_matcher: M) -> impl Matcher<R>
where
    R: HttpResponse + ?Sized,
    M: Matcher<[u8]>,
{
    EntityMatching::new(byte_matcher, |bytes: Vec<u8>| bytes)
}

/// Matches the response body, decoded as UTF-8 (invalid sequences replaced),
/// with `string_matcher`.
pub fn has_string_entity_matching<R, M>(string_matcher: M) -> impl Matcher<R>
where
    R: HttpResponse + ?Sized,
    M: Matcher<str>,
{
    has_string_entity_matching_in(UTF_8, string_matcher)
}

/// Like [`has_string_entity_matching`], decoding the body with `encoding`.
/// A byte order mark is not stripped.
pub fn has_string_entity_matching_in<R, M>(encoding: &'static Encoding, string_matcher: M) -> impl Matcher<R>
where
    R: HttpResponse + ?Sized,
    M: Matcher<str>,
{
    EntityMatching::new(string_matcher, move |bytes: Vec<u8>| {
        encoding.decode_without_bom_handling(&bytes).0.into_owned()
    })
}

pub fn has_entity_equal_to<R: HttpResponse + ?Sized>(bytes: impl Into<Vec<u8>>) -> impl Matcher<R> {
    has_entity_matching(equal_to::<[u8], Vec<u8>>(bytes.into()))
}

// ── Typed extraction ─────────────────────────────────────────────────────────

/// Assert that `response` is a 200 carrying `media_type` with a body, then
/// return the body. Panics with the assertion message otherwise.
#[track_caller]
fn expect_entity<R: HttpResponse + ?Sized>(response: &R, media_type: &str) -> Result<Vec<u8>> {
    let checks = [
        check(response, is_status(StatusCode::OK)),
        check(response, has_media_type(media_type)),
        check(response, has_entity()),
    ];
    if let Some(Err(message)) = checks.into_iter().find(|c| c.is_err()) {
        panic!("{message}");
    }
    Ok(response.read_entity()?)
}

/// Checks for an OK `application/pdf` response with a body and parses it.
#[track_caller]
pub fn expecting_pdf<R: HttpResponse + ?Sized>(response: &R) -> Result<Pdf> {
    let bytes = expect_entity(response, APPLICATION_PDF)?;
    Pdf::from_bytes(&bytes)
}

/// Checks for an OK `text/html` response with a body and parses it.
#[track_caller]
pub fn expecting_html_form<R: HttpResponse + ?Sized>(response: &R, base_uri: &str) -> Result<HtmlForm> {
    let bytes = expect_entity(response, TEXT_HTML)?;
    HtmlForm::create(&bytes, base_uri)
}
