//! Handler trait and type erasure.
//!
//! # How handlers are stored and wrapped
//!
//! Middleware turns one handler into another, and the router keeps handlers
//! of many concrete types in one table. Both need a single uniform type, so
//! every handler is erased behind `dyn ErasedHandler` and shared through an
//! `Arc`:
//!
//! ```text
//! async fn home(req: Request) -> Response { … }    ← user writes this
//!        ↓ boxed(home)
//! BoxedHandler(Arc::new(FnHandler(home)))          ← one allocation, at startup
//!        ↓ LoggingGate.wrap(handler)
//! BoxedHandler(Arc::new(FnHandler(closure)))       ← closure owns `next`
//!        ↓ handler.call(req)  at request time
//! Box::pin(async { … next.call(req).await … })     ← nested await, LIFO unwind
//! ```
//!
//! A [`BoxedHandler`] is itself a [`Handler`], so a composed handler can be
//! wrapped again, handed to a [`Chain`](crate::middleware::Chain), or
//! registered on the [`Router`](crate::Router) without further ceremony.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` let tokio move the future across worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears behind
/// the public [`BoxedHandler`].
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

// ── BoxedHandler ─────────────────────────────────────────────────────────────

/// A type-erased handler shared across concurrent requests.
///
/// Cloning is one atomic increment. Middleware captures its `next` handler
/// as a `BoxedHandler` and clones it into each request's future.
#[derive(Clone)]
pub struct BoxedHandler(Arc<dyn ErasedHandler + Send + Sync + 'static>);

impl BoxedHandler {
    /// Runs the handler for one request.
    pub fn call(&self, req: Request) -> BoxFuture {
        self.0.call(req)
    }
}

impl fmt::Debug for BoxedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoxedHandler")
    }
}

/// Erases any [`Handler`] into a [`BoxedHandler`].
pub fn boxed(handler: impl Handler) -> BoxedHandler {
    handler.into_boxed_handler()
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for everything that can answer a request.
///
/// You never implement this yourself. It is satisfied by any function or
/// closure with the shape
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// and by [`BoxedHandler`], the output of every middleware.
///
/// The trait is **sealed** (via the private `Sealed` supertrait) so only the
/// impls in this module can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

// ── Implementations ───────────────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        BoxedHandler(Arc::new(FnHandler(self)))
    }
}

impl private::Sealed for BoxedHandler {}

impl Handler for BoxedHandler {
    fn into_boxed_handler(self) -> BoxedHandler {
        self
    }
}

/// Newtype bridging a concrete handler function to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
