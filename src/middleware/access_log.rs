//! Request access logging into a shared sink.
//!
//! Every request through [`AccessLog`] appends exactly one line in Common Log
//! Format, extended with the handling latency in microseconds:
//!
//! ```text
//! 127.0.0.1 - lee [16/Oct/2026:09:12:44 +0000] "GET /log HTTP/1.1" 200 33 87
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use parking_lot::Mutex;
use tracing::warn;

use super::Middleware;
use super::basic_auth::AuthenticatedUser;
use crate::error::Error;
use crate::handler::{BoxedHandler, boxed};
use crate::request::Request;

/// An append-only log destination shared by every in-flight request.
///
/// Each line is formatted in full before the lock is taken and written with
/// a single `write_all`, so lines from concurrent requests never interleave.
#[derive(Clone)]
pub struct LogSink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl LogSink {
    /// Wraps any writer.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self { writer: Arc::new(Mutex::new(Box::new(writer))) }
    }

    /// Opens `path` for appending, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o664);
        }
        let file = options
            .open(path)
            .map_err(|source| Error::LogSink { path: path.to_owned(), source })?;
        Ok(Self::new(file))
    }

    /// Appends one line. `line` must already end with `\n`.
    pub fn write_line(&self, line: &str) -> std::io::Result<()> {
        self.writer.lock().write_all(line.as_bytes())
    }

    pub fn flush(&self) -> std::io::Result<()> {
        self.writer.lock().flush()
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LogSink")
    }
}

/// Always delegates, then appends one line describing the request and the
/// response to the [`LogSink`].
#[derive(Clone, Debug)]
pub struct AccessLog {
    sink: LogSink,
}

impl AccessLog {
    pub fn new(sink: LogSink) -> Self {
        Self { sink }
    }
}

/// Builds access-log middleware bound to `sink`, ready to wrap any number of
/// handlers.
pub fn access_log(sink: LogSink) -> impl Middleware {
    move |next: BoxedHandler| AccessLog::new(sink.clone()).wrap(next)
}

impl Middleware for AccessLog {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        let sink = self.sink.clone();
        boxed(move |req: Request| {
            let next = next.clone();
            let sink = sink.clone();
            async move {
                let started = Instant::now();
                let time = Local::now();
                let host = req.remote_addr().map_or_else(|| "-".to_owned(), |a| a.ip().to_string());
                let user = req.extensions().get::<AuthenticatedUser>().map(|u| u.0.clone());
                let method = req.method().clone();
                let uri = req
                    .uri()
                    .path_and_query()
                    .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned());
                let version = req.version();

                let res = next.call(req).await;

                let line = format!(
                    "{host} - {user} [{time}] \"{method} {uri} {version:?}\" {status} {size} {latency}\n",
                    user = user.as_deref().unwrap_or("-"),
                    time = time.format("%d/%b/%Y:%H:%M:%S %z"),
                    status = res.status_code().as_u16(),
                    size = res.body().len(),
                    latency = started.elapsed().as_micros(),
                );
                if let Err(e) = sink.write_line(&line) {
                    warn!("access log write failed: {e}");
                }
                res
            }
        })
    }
}
