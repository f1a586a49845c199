//! # weave
//!
//! Handlers wrapping handlers. A small HTTP stack built around one idea:
//! a middleware is a function from a handler to a handler.
//!
//! ## The pieces
//!
//! - [`Handler`] — anything that turns a [`Request`] into a [`Response`].
//! - [`Middleware`](middleware::Middleware) — a handler-to-handler
//!   transformation that may act before and after delegating, or
//!   short-circuit and answer on its own.
//! - [`Chain`](middleware::Chain) — an ordered list of middleware applied
//!   around a terminal handler, outermost first.
//! - [`Router`] — exact-path dispatch with a `404` fallback.
//! - [`Server`] — hyper on tokio, one task per connection, graceful shutdown.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use weave::handler::boxed;
//! use weave::middleware::{Chain, EnforceJson, LoggingGate, Middleware};
//! use weave::{Request, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), weave::Error> {
//!     let app = Router::new()
//!         .route("/", LoggingGate.wrap(boxed(home)))
//!         .route("/api", Chain::default().append(LoggingGate).append(EnforceJson::new()).then(api));
//!
//!     Server::bind("0.0.0.0:9000".parse().unwrap()).await?.serve(app).await
//! }
//!
//! async fn home(_req: Request) -> &'static str {
//!     "middlewares successfully executed"
//! }
//!
//! async fn api(req: Request) -> String {
//!     format!("{} bytes of json", req.body().len())
//! }
//! ```

mod config;
mod error;
mod request;
mod response;
mod router;
mod server;

pub mod handler;
pub mod middleware;
pub mod routes;

pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use request::{RemoteAddr, Request};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
