//! HTTP response encoder for serializing a fully buffered [`Response`]
//!
//! The wire format is fixed: a `HTTP/1.1 <code> OK` status line, `Content-Type`,
//! a `Content-Length` computed from the body, `Connection: close` and the permissive
//! CORS headers, followed by any other headers the response carries, a blank line
//! and the body bytes.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use http::header;
use tokio_util::codec::Encoder;

use crate::protocol::{Response, SendError};

/// Initial buffer size allocated for the status line and headers
const INIT_HEADER_SIZE: usize = 512;

const DEFAULT_CONTENT_TYPE: &[u8] = b"text/plain; charset=utf-8";

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Encoder for HTTP responses implementing the [`Encoder`] trait.
#[derive(Debug, Default)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Response> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, response: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (parts, body) = response.into_parts();

        dst.reserve(INIT_HEADER_SIZE + body.len());
        write!(FastWrite(dst), "HTTP/1.1 {} OK\r\n", parts.status.as_str())?;

        let content_type = parts.headers.get(header::CONTENT_TYPE).map_or(DEFAULT_CONTENT_TYPE, |value| value.as_bytes());
        put_header(dst, header::CONTENT_TYPE.as_str(), content_type);
        write!(FastWrite(dst), "content-length: {}\r\n", body.len())?;
        put_header(dst, header::CONNECTION.as_str(), b"close");
        put_header(dst, header::ACCESS_CONTROL_ALLOW_ORIGIN.as_str(), ALLOW_ORIGIN.as_bytes());
        put_header(dst, header::ACCESS_CONTROL_ALLOW_METHODS.as_str(), ALLOW_METHODS.as_bytes());
        put_header(dst, header::ACCESS_CONTROL_ALLOW_HEADERS.as_str(), ALLOW_HEADERS.as_bytes());

        for (name, value) in parts.headers.iter() {
            if MANAGED_HEADERS.contains(name) {
                continue;
            }
            put_header(dst, name.as_str(), value.as_bytes());
        }

        dst.put_slice(b"\r\n");
        dst.put_slice(&body);
        Ok(())
    }
}

/// Headers the encoder writes itself, a handler supplied copy is ignored.
const MANAGED_HEADERS: [header::HeaderName; 7] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::ACCESS_CONTROL_ALLOW_ORIGIN,
    header::ACCESS_CONTROL_ALLOW_METHODS,
    header::ACCESS_CONTROL_ALLOW_HEADERS,
];

fn put_header(dst: &mut BytesMut, name: &str, value: &[u8]) {
    dst.put_slice(name.as_bytes());
    dst.put_slice(b": ");
    dst.put_slice(value);
    dst.put_slice(b"\r\n");
}

/// Adapts a [`BytesMut`] to [`io::Write`] so `write!` can format into it directly.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
