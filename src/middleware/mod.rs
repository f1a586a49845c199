//! Middleware layer.
//!
//! A middleware turns one handler into another. The handler it returns may do
//! work before delegating to `next`, may do work after `next` returns, and
//! may decide not to delegate at all (a short-circuit). Because delegation is
//! a plain nested `.await`, an outer layer's "after" code always runs once
//! every inner layer and the terminal handler have finished.
//!
//! Two ways to compose, observably identical for the same list and order:
//!
//! ```rust
//! use weave::handler::boxed;
//! use weave::middleware::{Chain, LoggingGate, Middleware, PathGate, layer};
//! use weave::Request;
//!
//! async fn home(_req: Request) -> &'static str { "home" }
//!
//! // manual nesting
//! let nested = LoggingGate.wrap(PathGate::new("/icons").wrap(boxed(home)));
//!
//! // list
//! let listed = Chain::new([layer(LoggingGate), layer(PathGate::new("/icons"))]).then(home);
//!
//! // builder
//! let chained = Chain::default()
//!     .append(LoggingGate)
//!     .append(PathGate::new("/icons"))
//!     .then(home);
//! ```
//!
//! Built-in middleware:
//! - [`LoggingGate`] / [`PathGate`] — entry/exit tracing, blocked-path gate
//! - [`EnforceJson`] / [`InjectJson`] — content-type enforcement and override
//! - [`BasicAuth`] — HTTP basic authentication challenge
//! - [`AccessLog`] — one Common Log Format line per request into a [`LogSink`]

mod access_log;
mod basic_auth;
mod chain;
mod content_type;
mod logging;

pub use access_log::{AccessLog, LogSink, access_log};
pub use basic_auth::{AuthenticatedUser, BasicAuth};
pub use chain::{Chain, layer};
pub use content_type::{EnforceJson, InjectJson};
pub use logging::{LoggingGate, PathGate};

use http::StatusCode;

use crate::handler::BoxedHandler;
use crate::response::Response;

/// A handler-to-handler transformation.
///
/// `wrap` only builds the new handler. No request logic runs until the
/// returned handler is called.
///
/// Any `Fn(BoxedHandler) -> BoxedHandler` is a middleware, so a plain
/// function works as well as a configured struct:
///
/// ```rust
/// use weave::handler::{BoxedHandler, boxed};
/// use weave::Request;
///
/// fn trace(next: BoxedHandler) -> BoxedHandler {
///     boxed(move |req: Request| {
///         let next = next.clone();
///         async move {
///             tracing::info!(path = req.path(), "before");
///             let res = next.call(req).await;
///             tracing::info!("after");
///             res
///         }
///     })
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

impl<F> Middleware for F
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        self(next)
    }
}

/// What a gate answers when it refuses to delegate for lack of permission
/// (blocked path, missing `content-type`).
///
/// `Silent` is the classic behaviour: the gate returns without writing, so
/// the client receives an empty `200 OK`. `Explicit` answers `403 Forbidden`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Rejection {
    #[default]
    Silent,
    Explicit,
}

impl Rejection {
    pub(crate) fn response(self) -> Response {
        match self {
            Self::Silent => Response::empty(),
            Self::Explicit => Response::error(StatusCode::FORBIDDEN, "Forbidden"),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers shared by the middleware unit tests.

    use std::sync::Arc;

    use bytes::Bytes;
    use parking_lot::Mutex;

    use super::Middleware;
    use crate::handler::{BoxedHandler, boxed};
    use crate::request::Request;

    /// Ordered record of what ran.
    #[derive(Clone, Default)]
    pub(crate) struct Trace(Arc<Mutex<Vec<String>>>);

    impl Trace {
        pub(crate) fn push(&self, event: impl Into<String>) {
            self.0.lock().push(event.into());
        }

        pub(crate) fn events(&self) -> Vec<String> {
            self.0.lock().clone()
        }

        /// Middleware that records `pre:<name>` and `post:<name>`.
        pub(crate) fn layer(&self, name: &'static str) -> impl Middleware + use<> {
            let trace = self.clone();
            move |next: BoxedHandler| {
                let trace = trace.clone();
                boxed(move |req: Request| {
                    let next = next.clone();
                    let trace = trace.clone();
                    async move {
                        trace.push(format!("pre:{name}"));
                        let res = next.call(req).await;
                        trace.push(format!("post:{name}"));
                        res
                    }
                })
            }
        }

        /// Terminal handler that records `handler` and answers `body`.
        pub(crate) fn terminal(&self, body: &'static str) -> BoxedHandler {
            let trace = self.clone();
            boxed(move |_req: Request| {
                let trace = trace.clone();
                async move {
                    trace.push("handler");
                    body
                }
            })
        }
    }

    pub(crate) fn request(path: &str) -> http::request::Builder {
        http::Request::builder().uri(path)
    }

    pub(crate) fn build(builder: http::request::Builder) -> Request {
        builder.body(Bytes::new()).unwrap().into()
    }
}
