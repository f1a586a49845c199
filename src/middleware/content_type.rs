//! Content-type enforcement and injection.
//!
//! Order matters: [`InjectJson`] placed outside [`EnforceJson`] makes the
//! enforcement check pass for every request, whatever the client sent.

use std::collections::HashSet;

use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderValue};
use tracing::info;

use super::{Middleware, Rejection};
use crate::handler::{BoxedHandler, boxed};
use crate::request::Request;
use crate::response::Response;

const FAILED: &str = "Middleware failed. Cannot continue.";

/// Outcome of inspecting a request's `content-type`.
#[derive(Debug, PartialEq, Eq)]
enum Verdict {
    Json,
    Missing,
    Malformed,
    Unsupported,
}

fn inspect(value: Option<&HeaderValue>) -> Verdict {
    let Some(value) = value else { return Verdict::Missing };
    let Ok(value) = value.to_str() else { return Verdict::Malformed };
    if value.is_empty() {
        return Verdict::Missing;
    }

    let mut parts = segments(value).into_iter().map(str::trim);
    let essence = parts.next().unwrap_or_default();
    let mut params: Vec<&str> = parts.collect();
    // one trailing `;` is tolerated
    if params.last() == Some(&"") {
        params.pop();
    }
    if params.iter().any(|param| param.is_empty()) {
        return Verdict::Malformed;
    }

    let normalized = params.iter().fold(essence.to_owned(), |mut acc, param| {
        acc.push_str("; ");
        acc.push_str(param);
        acc
    });
    let Ok(media) = normalized.parse::<mime::Mime>() else { return Verdict::Malformed };

    let mut seen = HashSet::new();
    if !media.params().all(|(name, _)| seen.insert(name.as_str().to_ascii_lowercase())) {
        return Verdict::Malformed;
    }

    if media.essence_str().eq_ignore_ascii_case("application/json") {
        Verdict::Json
    } else {
        Verdict::Unsupported
    }
}

/// Splits on `;` outside quoted strings.
fn segments(value: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let (mut start, mut quoted, mut escaped) = (0, false, false);
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                out.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&value[start..]);
    out
}

/// Delegates only for `application/json` requests. Parameters such as
/// `charset` are ignored.
///
/// | `content-type` | Answer |
/// |---|---|
/// | absent | the [`Rejection`] policy (empty `200` by default) |
/// | unparseable | `400` "Malformed Content-Type" |
/// | any other media type | `415` "content type must be 'application/json'" |
#[derive(Clone, Copy, Debug, Default)]
pub struct EnforceJson {
    rejection: Rejection,
}

impl EnforceJson {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets what a request without `content-type` receives.
    #[must_use]
    pub fn rejection(mut self, rejection: Rejection) -> Self {
        self.rejection = rejection;
        self
    }
}

impl Middleware for EnforceJson {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        let rejection = self.rejection;
        boxed(move |req: Request| {
            let next = next.clone();
            async move {
                info!("Running enforceJSONHandler middleware...");
                match inspect(req.headers().get(CONTENT_TYPE)) {
                    Verdict::Json => {}
                    Verdict::Missing => {
                        info!("{FAILED}");
                        info!("Content-Type header must be provided.");
                        return rejection.response();
                    }
                    Verdict::Malformed => {
                        info!("{FAILED}");
                        return Response::error(StatusCode::BAD_REQUEST, "Malformed Content-Type");
                    }
                    Verdict::Unsupported => {
                        info!("{FAILED}");
                        return Response::error(
                            StatusCode::UNSUPPORTED_MEDIA_TYPE,
                            "content type must be 'application/json'",
                        );
                    }
                }
                let res = next.call(req).await;
                info!("Returning through enforceJSONHandler middleware...");
                res
            }
        })
    }
}

/// Overwrites the request's `content-type` with `application/json`, then
/// delegates.
#[derive(Clone, Copy, Debug, Default)]
pub struct InjectJson;

impl Middleware for InjectJson {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        boxed(move |mut req: Request| {
            req.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            next.call(req)
        })
    }
}
