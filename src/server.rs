//! HTTP server and graceful shutdown.
//!
//! # Lifecycle
//!
//! 1. [`Server::bind`] claims the listening socket. Failure here is fatal for
//!    the caller; nothing is retried.
//! 2. [`Server::serve`] takes ownership of the finished [`Router`]. From this
//!    point the route table is read-only and shared by every connection task.
//! 3. On SIGTERM / Ctrl-C the accept loop stops and every open connection is
//!    told to close. In-flight requests run to completion, idle keep-alive
//!    connections close at once, and `serve` returns. Anything the handlers share,
//!    such as an access-log sink, therefore outlives the last request.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::error::Error;
use crate::request::{RemoteAddr, Request};
use crate::response::Response;
use crate::router::Router;

/// The HTTP server.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Binds the listening socket.
    ///
    /// ```rust,no_run
    /// # async fn run() -> Result<(), weave::Error> {
    /// use weave::{Router, Server};
    ///
    /// let server = Server::bind("0.0.0.0:9000".parse().unwrap()).await?;
    /// server.serve(Router::new()).await
    /// # }
    /// ```
    pub async fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        Ok(Self { listener })
    }

    /// The address actually bound, useful after binding port `0`.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then drains in-flight
    /// connections and returns.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves `router` until `signal` resolves, then drains in-flight
    /// connections and returns.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let addr = self.local_addr()?;

        // Shared, never mutated again.
        let router = Arc::new(router);

        info!(%addr, "weave listening");

        // HTTP/1.1 or HTTP/2, whichever the client speaks.
        let builder = ConnBuilder::new(TokioExecutor::new());

        // Every connection is watched so shutdown can ask it to close.
        let graceful = GracefulShutdown::new();

        // One task per connection; the set lets shutdown wait for all of them.
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting immediately,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = self.listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);

                    // Called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { dispatch(&router, req, remote_addr).await }
                    });

                    let conn = builder
                        .serve_connection_with_upgrades(TokioIo::new(stream), svc)
                        .into_owned();
                    let conn = graceful.watch(conn);

                    tasks.spawn(async move {
                        if let Err(e) = conn.await {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the set stays small.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // No new connections; idle ones close now, busy ones after their
        // current response.
        drop(self.listener);
        graceful.shutdown().await;
        while tasks.join_next().await.is_some() {}

        info!("weave stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response.
///
/// Every failure becomes a response, so hyper never sees an error.
async fn dispatch(
    router: &Router,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!(peer = %remote_addr, "request body error: {e}");
            return Ok(Response::error(StatusCode::BAD_REQUEST, "Bad Request").into_inner());
        }
    };

    let mut req = Request::from(http::Request::from_parts(parts, body));
    req.extensions_mut().insert(RemoteAddr(remote_addr));

    let handler = router.dispatch(req.path());
    let response = handler.call(req).await;

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C) the process receives.
/// A signal that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    // Only Ctrl-C exists off Unix.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
