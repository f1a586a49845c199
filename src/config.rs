//! Process configuration.
//!
//! Every setting has a command-line flag, an environment fallback, and a
//! default that reproduces the classic demo: port 9000, `server.log`,
//! credentials `lee` / `pass`, and `/icons` as the blocked path.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::middleware::Rejection;

#[derive(Clone, Debug, Parser)]
#[command(name = "weave", version, about = "HTTP middleware composition demo server")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "WEAVE_ADDR", default_value = "0.0.0.0:9000")]
    pub addr: SocketAddr,

    /// Access-log file, opened for appending and created if absent.
    #[arg(long, env = "WEAVE_LOG_FILE", default_value = "server.log")]
    pub log_file: PathBuf,

    /// User name accepted by `/signup`.
    #[arg(long, env = "WEAVE_USERNAME", default_value = "lee")]
    pub username: String,

    /// Password accepted by `/signup`.
    #[arg(long, env = "WEAVE_PASSWORD", default_value = "pass", hide_env_values = true)]
    pub password: String,

    /// Path refused by the path gate on `/` and `/easychain`.
    #[arg(long, env = "WEAVE_BLOCKED_PATH", default_value = "/icons")]
    pub blocked_path: String,

    /// What gated requests receive: an empty 200 (`silent`) or 403 (`explicit`).
    #[arg(long, env = "WEAVE_REJECTION", value_enum, default_value_t = Rejection::Silent)]
    pub rejection: Rejection,
}
