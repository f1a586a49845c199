//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Exactly one layer of a chain produces the response. Middleware that
//! delegates passes the inner response through; middleware that
//! short-circuits builds its own.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue, X_CONTENT_TYPE_OPTIONS};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use http::StatusCode;
/// use weave::Response;
///
/// Response::text("middlewares successfully executed");
/// Response::status(StatusCode::NO_CONTENT);
/// Response::error(StatusCode::BAD_REQUEST, "Malformed Content-Type");
///
/// Response::builder()
///     .status(StatusCode::UNAUTHORIZED)
///     .header(http::header::WWW_AUTHENTICATE, r#"Basic realm="Restricted""#)
///     .text("Unauthorized\n");
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self { status: code, headers: HeaderMap::new(), body: Bytes::new() }
    }

    /// What the client sees when a handler returns without writing anything:
    /// `200 OK`, no headers, no body.
    pub fn empty() -> Self {
        Self::status(StatusCode::OK)
    }

    /// Plain-text error reply: the message plus a trailing newline, with
    /// content sniffing disabled.
    pub fn error(code: StatusCode, message: &str) -> Self {
        Self::builder()
            .status(code)
            .header(X_CONTENT_TYPE_OPTIONS, "nosniff")
            .text(format!("{message}\n"))
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: HeaderMap::new(), status: StatusCode::OK }
    }

    /// Sets a header whose value was computed at runtime, replacing any
    /// existing value.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
#[derive(Debug)]
pub struct ResponseBuilder {
    headers: HeaderMap,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// Appends a header. The value must be a static, visible-ASCII string.
    pub fn header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.append(name, HeaderValue::from_static(value));
        self
    }

    /// Terminate with a plain-text body.
    pub fn text(mut self, body: impl Into<String>) -> Response {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
        Response { body: Bytes::from(body.into()), headers: self.headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a bare [`StatusCode`] from a handler: `return StatusCode::NOT_FOUND`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_reply_mirrors_plain_text_errors() {
        let res = Response::error(StatusCode::UNSUPPORTED_MEDIA_TYPE, "nope");
        assert_eq!(res.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(res.body(), "nope\n");
        assert_eq!(res.headers()[CONTENT_TYPE], TEXT_PLAIN);
        assert_eq!(res.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[test]
    fn with_header_keeps_the_error_headers() {
        let res = Response::error(StatusCode::UNAUTHORIZED, "Unauthorized")
            .with_header(http::header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        assert_eq!(res.headers()[http::header::WWW_AUTHENTICATE], "Basic");
        assert_eq!(res.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(res.body(), "Unauthorized\n");
    }

    #[test]
    fn empty_has_nothing_written() {
        let res = Response::empty();
        assert_eq!(res.status_code(), StatusCode::OK);
        assert!(res.headers().is_empty());
        assert!(res.body().is_empty());
    }

    #[test]
    fn into_inner_keeps_status_headers_and_body() {
        let res = Response::builder()
            .status(StatusCode::CREATED)
            .header(http::header::LOCATION, "/users/42")
            .text("made")
            .into_inner();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()[http::header::LOCATION], "/users/42");
        assert_eq!(res.headers()[CONTENT_TYPE], TEXT_PLAIN);
    }
}
