//! Unified error type.

use std::net::SocketAddr;
use std::path::PathBuf;

/// The error type returned by weave's fallible operations.
///
/// Client mistakes (bad credentials, wrong content type, unknown path) are
/// expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
/// This type surfaces startup and infrastructure failures, all of which are
/// fatal for the process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The listening endpoint could not be bound.
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The access-log destination could not be opened.
    #[error("cannot open log sink {}: {source}", path.display())]
    LogSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
