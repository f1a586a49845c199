//! Exact-path request router.
//!
//! One table, one lookup. A path either matches a registered entry byte for
//! byte or falls through to `404 Not Found`. No prefixes, no patterns, no
//! per-method trees: method handling, if any, belongs to the handler.

use std::collections::HashMap;

use http::StatusCode;

use crate::handler::{BoxedHandler, Handler, boxed};
use crate::request::Request;

/// The application route table.
///
/// Build it once at startup, then hand it to [`Server::serve`](crate::Server::serve),
/// which takes ownership. Nothing can register a route after serving begins.
/// Each [`Router::route`] call returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<String, BoxedHandler>,
    not_found: BoxedHandler,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            not_found: boxed(not_found),
        }
    }

    /// Register a handler for an exact path. Returns `self` for chaining.
    ///
    /// ```rust
    /// # use weave::{Request, Router};
    /// # async fn home(_: Request) -> &'static str { "" }
    /// # async fn signup(_: Request) -> &'static str { "" }
    /// Router::new()
    ///     .route("/",       home)
    ///     .route("/signup", signup);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` does not start with `/` or is already registered.
    /// Both are wiring mistakes that should stop the process at startup.
    pub fn route(mut self, path: &str, handler: impl Handler) -> Self {
        assert!(path.starts_with('/'), "invalid route `{path}`: must start with `/`");
        if self.routes.insert(path.to_owned(), handler.into_boxed_handler()).is_some() {
            panic!("invalid route `{path}`: already registered");
        }
        self
    }

    /// Returns the handler registered for `path`, or the `404` handler.
    pub fn dispatch(&self, path: &str) -> BoxedHandler {
        self.routes.get(path).unwrap_or(&self.not_found).clone()
    }

    /// Registered paths, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("routes", &self.routes.keys()).finish()
    }
}

async fn not_found(_req: Request) -> StatusCode {
    StatusCode::NOT_FOUND
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn get(path: &str) -> Request {
        http::Request::builder().uri(path).body(Bytes::new()).unwrap().into()
    }

    fn app() -> Router {
        Router::new()
            .route("/", |_req: Request| async { "root" })
            .route("/signup", |_req: Request| async { "signup" })
    }

    #[tokio::test]
    async fn registered_paths_reach_their_handler() {
        let router = app();
        assert_eq!(router.dispatch("/").call(get("/")).await.body(), "root");
        assert_eq!(router.dispatch("/signup").call(get("/signup")).await.body(), "signup");
    }

    #[tokio::test]
    async fn unregistered_paths_are_not_found() {
        let router = app();
        for path in ["/unregistered", "/signup/", "/Signup", "/icons"] {
            let res = router.dispatch(path).call(get(path)).await;
            assert_eq!(res.status_code(), StatusCode::NOT_FOUND, "path {path}");
        }
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_route_panics() {
        let _ = app().route("/", |_req: Request| async { "again" });
    }

    #[test]
    #[should_panic(expected = "must start with `/`")]
    fn relative_route_panics() {
        let _ = Router::new().route("log", |_req: Request| async { "" });
    }
}
