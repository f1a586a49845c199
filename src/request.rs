//! Incoming HTTP request type.

use std::net::SocketAddr;

use bytes::Bytes;
use http::{Extensions, HeaderMap, Method, Uri, Version};

/// An incoming HTTP request with its body already collected.
///
/// Middleware receives the request by value. It may rewrite headers in place
/// before delegating (see [`InjectJson`](crate::middleware::InjectJson)), and
/// it may attach typed values to the per-request context bag returned by
/// [`extensions_mut`](Request::extensions_mut). Prefer the bag for passing
/// data between middleware layers: headers are wire format, the bag is typed.
pub struct Request {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
    extensions: Extensions,
}

/// Address of the peer that sent the request, inserted by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemoteAddr(pub SocketAddr);

impl Request {
    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn version(&self) -> Version { self.version }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII
    /// read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The typed per-request context bag.
    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }

    /// Peer address, when the request arrived through the [`Server`](crate::Server).
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.extensions.get::<RemoteAddr>().map(|a| a.0)
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body,
            extensions: parts.extensions,
        }
    }
}
