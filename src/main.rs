//! The demo server.
//!
//! Run with:
//!   RUST_LOG=info cargo run
//!
//! Try:
//!   curl -i http://localhost:9000/
//!   curl -i http://localhost:9000/easychain
//!   curl -i http://localhost:9000/headers -H 'content-type: text/plain'
//!   curl -i -u lee:pass http://localhost:9000/signup
//!   curl -i http://localhost:9000/log && tail -n1 server.log

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use weave::middleware::LogSink;
use weave::routes::{self, RouteConfig};
use weave::{Config, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    let sink = LogSink::open(&config.log_file)?;
    let app = routes::router(&RouteConfig::from(&config), &sink);
    info!(routes = ?app.paths().collect::<Vec<_>>(), log_file = %config.log_file.display(), "routes registered");

    let server = Server::bind(config.addr).await?;
    info!("Starting server on http://{}...", server.local_addr()?);
    server.serve(app).await?;

    sink.flush().context("flushing access log")?;
    Ok(())
}
