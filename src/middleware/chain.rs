//! Ordered middleware composition.

use std::fmt;
use std::sync::Arc;

use super::Middleware;
use crate::handler::{BoxedHandler, Handler};

/// An immutable, ordered list of middleware.
///
/// `Chain::new([layer(m1), layer(m2)]).then(h)` builds the same handler as
/// `m1.wrap(m2.wrap(boxed(h)))`: the first middleware in the list is the
/// outermost layer and sees the request first and the response last.
/// `Chain::default().append(m1).append(m2)` builds the same list.
///
/// Chains are cheap to clone and never change once built. [`append`] and
/// [`extend`] return a new chain, so a shared base chain can be specialised
/// per route without affecting other routes.
///
/// [`append`]: Chain::append
/// [`extend`]: Chain::extend
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<Arc<dyn Middleware>>,
}

/// Erases a middleware so layers of different types fit in one list.
pub fn layer(middleware: impl Middleware) -> Arc<dyn Middleware> {
    Arc::new(middleware)
}

impl Chain {
    /// A chain of `layers`, outermost first.
    pub fn new(layers: impl IntoIterator<Item = Arc<dyn Middleware>>) -> Self {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    /// Returns a new chain with `middleware` added as the innermost layer.
    #[must_use]
    pub fn append(&self, middleware: impl Middleware) -> Self {
        let mut layers = self.layers.clone();
        layers.push(Arc::new(middleware));
        Self { layers }
    }

    /// Returns a new chain running `self`'s layers, then `other`'s.
    #[must_use]
    pub fn extend(&self, other: &Chain) -> Self {
        let mut layers = self.layers.clone();
        layers.extend(other.layers.iter().cloned());
        Self { layers }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Wraps `handler` in every layer and returns the composite handler.
    ///
    /// An empty chain returns `handler` unchanged.
    pub fn then(&self, handler: impl Handler) -> BoxedHandler {
        self.layers
            .iter()
            .rev()
            .fold(handler.into_boxed_handler(), |inner, layer| layer.wrap(inner))
    }
}

impl FromIterator<Arc<dyn Middleware>> for Chain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Middleware>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("layers", &self.layers.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::boxed;
    use crate::middleware::testing::{Trace, build, request};
    use crate::middleware::{LoggingGate, PathGate};
    use crate::request::Request;
    use crate::response::Response;
    use http::StatusCode;

    #[tokio::test]
    async fn pre_logic_runs_in_order_and_post_logic_unwinds_lifo() {
        let trace = Trace::default();
        let handler = Chain::default()
            .append(trace.layer("m1"))
            .append(trace.layer("m2"))
            .append(trace.layer("m3"))
            .then(trace.terminal("done"));

        let res = handler.call(build(request("/"))).await;

        assert_eq!(res.body(), "done");
        assert_eq!(
            trace.events(),
            ["pre:m1", "pre:m2", "pre:m3", "handler", "post:m3", "post:m2", "post:m1"]
        );
    }

    #[tokio::test]
    async fn building_runs_no_middleware_logic() {
        let trace = Trace::default();
        let _handler = Chain::default()
            .append(trace.layer("m1"))
            .append(trace.layer("m2"))
            .then(trace.terminal("done"));

        assert!(trace.events().is_empty());
    }

    #[tokio::test]
    async fn builder_and_manual_nesting_are_equivalent() {
        let nested_trace = Trace::default();
        let nested = nested_trace.layer("a").wrap(
            nested_trace
                .layer("b")
                .wrap(nested_trace.terminal("ok")),
        );

        let chained_trace = Trace::default();
        let chained = Chain::default()
            .append(chained_trace.layer("a"))
            .append(chained_trace.layer("b"))
            .then(chained_trace.terminal("ok"));

        let a = nested.call(build(request("/"))).await;
        let b = chained.call(build(request("/"))).await;

        assert_eq!(a.status_code(), b.status_code());
        assert_eq!(a.body(), b.body());
        assert_eq!(nested_trace.events(), chained_trace.events());
    }

    #[tokio::test]
    async fn list_form_matches_manual_nesting() {
        let nested_trace = Trace::default();
        let nested = nested_trace.layer("a").wrap(
            nested_trace
                .layer("b")
                .wrap(nested_trace.layer("c").wrap(nested_trace.terminal("ok"))),
        );

        let listed_trace = Trace::default();
        let listed = Chain::new([
            layer(listed_trace.layer("a")),
            layer(listed_trace.layer("b")),
            layer(listed_trace.layer("c")),
        ])
        .then(listed_trace.terminal("ok"));

        let collected: Chain = ["a", "b", "c"]
            .into_iter()
            .map(|name| layer(listed_trace.layer(name)))
            .collect();
        assert_eq!(collected.len(), 3);

        let a = nested.call(build(request("/"))).await;
        let b = listed.call(build(request("/"))).await;

        assert_eq!(a.status_code(), b.status_code());
        assert_eq!(a.body(), b.body());
        assert_eq!(nested_trace.events(), listed_trace.events());
        assert_eq!(
            listed_trace.events(),
            ["pre:a", "pre:b", "pre:c", "handler", "post:c", "post:b", "post:a"]
        );
    }

    #[tokio::test]
    async fn heterogeneous_list_gates_like_nesting() {
        let listed = Chain::new([layer(LoggingGate), layer(PathGate::new("/icons"))])
            .then(|_req: Request| async { "home" });

        let res = listed.call(build(request("/icons"))).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), "");

        let res = listed.call(build(request("/"))).await;
        assert_eq!(res.body(), "home");
    }

    #[tokio::test]
    async fn short_circuit_hides_inner_layers_and_handler() {
        let trace = Trace::default();
        let gate = |_next: BoxedHandler| {
            boxed(|_req: Request| async { Response::status(StatusCode::FORBIDDEN) })
        };
        let handler = Chain::default()
            .append(trace.layer("outer"))
            .append(gate)
            .append(trace.layer("inner"))
            .then(trace.terminal("unreachable"));

        let res = handler.call(build(request("/"))).await;

        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(trace.events(), ["pre:outer", "post:outer"]);
    }

    #[tokio::test]
    async fn append_leaves_the_base_chain_untouched() {
        let base = Chain::default().append(LoggingGate);
        let longer = base.append(PathGate::new("/icons"));
        let combined = base.extend(&longer);

        assert_eq!(base.len(), 1);
        assert_eq!(longer.len(), 2);
        assert_eq!(combined.len(), 3);
    }

    #[tokio::test]
    async fn empty_chain_is_the_handler_itself() {
        let handler = Chain::default().then(|_req: Request| async { "bare" });
        assert_eq!(handler.call(build(request("/"))).await.body(), "bare");
    }
}
