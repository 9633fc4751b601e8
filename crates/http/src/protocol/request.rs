//! HTTP request head and request handling implementation.
//!
//! The head keeps the request target exactly as it arrived on the wire. Splitting
//! it into path and query, and percent-decoding either part, is left to the
//! routing layer.

use bytes::Bytes;
use http::{HeaderMap, Method, header};

/// The parsed head of an HTTP request: request line plus header map.
///
/// Header names are case-insensitive, a header repeated on the wire keeps only
/// its last value.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    target: String,
    version: String,
    headers: HeaderMap,
}

impl RequestHead {
    pub fn new(method: Method, target: impl Into<String>, version: impl Into<String>, headers: HeaderMap) -> Self {
        Self { method, target: target.into(), version: version.into(), headers }
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw request target, e.g. `/api/echo/hi?times=3`.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the protocol version token of the request line, e.g. `HTTP/1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw path part of the target, everything before the first `?`.
    pub fn path(&self) -> &str {
        self.target.split_once('?').map_or(self.target.as_str(), |(path, _)| path)
    }

    /// The raw query part of the target, empty when there is no `?`.
    pub fn query(&self) -> &str {
        self.target.split_once('?').map_or("", |(_, query)| query)
    }

    /// The declared body length.
    ///
    /// A missing or unparsable `Content-Length` means there is no body to read.
    pub fn content_length(&self) -> usize {
        self.headers
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0)
    }

    /// Attaches a body to this head, converting it into a full [`Request`].
    pub fn body(self, body: Bytes) -> Request {
        Request { head: self, body }
    }
}

/// A fully read request: the head and the fixed-length body that followed it.
#[derive(Debug, Clone)]
pub struct Request {
    head: RequestHead,
    body: Bytes,
}

impl Request {
    pub fn new(head: RequestHead, body: Bytes) -> Self {
        Self { head, body }
    }

    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn method(&self) -> &Method {
        self.head.method()
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_parts(self) -> (RequestHead, Bytes) {
        (self.head, self.body)
    }
}
