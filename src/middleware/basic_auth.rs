//! HTTP basic authentication.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use http::StatusCode;
use http::header::{AUTHORIZATION, HeaderValue, WWW_AUTHENTICATE};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::Middleware;
use crate::handler::{BoxedHandler, boxed};
use crate::request::Request;
use crate::response::Response;

/// The user name that passed [`BasicAuth`], stored in the request's context
/// bag for the layers and handler inside the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

/// Challenges every request that does not carry the configured credentials.
///
/// Credentials are compared as SHA-256 digests in constant time, so the
/// response time says nothing about how much of a guess was right.
#[derive(Clone)]
pub struct BasicAuth {
    inner: Arc<Inner>,
}

struct Inner {
    user: [u8; 32],
    pass: [u8; 32],
    challenge: HeaderValue,
}

impl BasicAuth {
    pub fn new(user: &str, pass: &str) -> Self {
        Self::with_realm(user, pass, "Restricted")
    }

    /// Like [`new`](BasicAuth::new) with a custom realm. Quotes and control
    /// characters in `realm` are dropped from the challenge.
    pub fn with_realm(user: &str, pass: &str, realm: &str) -> Self {
        let realm: String = realm.chars().filter(|c| *c != '"' && !c.is_control()).collect();
        let challenge = HeaderValue::from_str(&format!("Basic realm=\"{realm}\""))
            .unwrap_or_else(|_| HeaderValue::from_static("Basic realm=\"Restricted\""));
        Self {
            inner: Arc::new(Inner {
                user: digest(user.as_bytes()),
                pass: digest(pass.as_bytes()),
                challenge,
            }),
        }
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("challenge", &self.inner.challenge)
            .finish_non_exhaustive()
    }
}

impl Inner {
    /// Returns the user name when `header` carries matching credentials.
    fn authenticate(&self, header: Option<&HeaderValue>) -> Option<String> {
        let (scheme, encoded) = header?.to_str().ok()?.split_once(' ')?;
        if scheme != "Basic" {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, pass) = decoded.split_once(':')?;

        let user_ok = constant_time_eq(&digest(user.as_bytes()), &self.user);
        let pass_ok = constant_time_eq(&digest(pass.as_bytes()), &self.pass);
        (user_ok & pass_ok).then(|| user.to_owned())
    }

    fn unauthorized(&self) -> Response {
        Response::error(StatusCode::UNAUTHORIZED, "Unauthorized")
            .with_header(WWW_AUTHENTICATE, self.challenge.clone())
    }
}

impl Middleware for BasicAuth {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        let inner = Arc::clone(&self.inner);
        boxed(move |mut req: Request| {
            let next = next.clone();
            let inner = Arc::clone(&inner);
            async move {
                match inner.authenticate(req.headers().get(AUTHORIZATION)) {
                    Some(user) => {
                        debug!(%user, "basic auth accepted");
                        req.extensions_mut().insert(AuthenticatedUser(user));
                        next.call(req).await
                    }
                    None => {
                        warn!(path = req.path(), "basic auth rejected");
                        inner.unauthorized()
                    }
                }
            }
        })
    }
}

fn digest(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
