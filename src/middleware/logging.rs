//! Entry/exit tracing and the blocked-path gate.

use std::sync::Arc;

use tracing::info;

use super::{Middleware, Rejection};
use crate::handler::{BoxedHandler, boxed};
use crate::request::Request;

/// Logs on the way in, always delegates, logs on the way out.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingGate;

impl Middleware for LoggingGate {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        boxed(move |req: Request| {
            let next = next.clone();
            async move {
                info!("Running middleware A...");
                let res = next.call(req).await;
                info!("Running middleware A returning...");
                res
            }
        })
    }
}

/// Refuses to delegate when the request path equals the blocked path.
///
/// The comparison is exact: blocking `/icons` leaves `/icons/` and
/// `/icons/a.png` alone.
#[derive(Clone, Debug)]
pub struct PathGate {
    blocked: Arc<str>,
    rejection: Rejection,
}

impl PathGate {
    pub fn new(blocked: impl Into<Arc<str>>) -> Self {
        Self { blocked: blocked.into(), rejection: Rejection::default() }
    }

    /// Sets what a blocked request receives. Defaults to [`Rejection::Silent`].
    #[must_use]
    pub fn rejection(mut self, rejection: Rejection) -> Self {
        self.rejection = rejection;
        self
    }
}

impl Middleware for PathGate {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        let blocked = Arc::clone(&self.blocked);
        let rejection = self.rejection;
        boxed(move |req: Request| {
            let next = next.clone();
            let blocked = Arc::clone(&blocked);
            async move {
                info!("Running middleware B...");
                if req.path() == &*blocked {
                    info!(path = %blocked, "middleware B failed. Cannot execute home handler.");
                    return rejection.response();
                }
                let res = next.call(req).await;
                info!("Running middleware B returning...");
                res
            }
        })
    }
}
