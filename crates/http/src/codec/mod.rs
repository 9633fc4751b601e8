//! HTTP codec module for decoding request heads and encoding responses
//!
//! Both halves plug into `tokio_util`'s framing: a
//! [`FramedRead`](tokio_util::codec::FramedRead) drives the [`HeaderDecoder`] over the
//! read half of a connection, a [`FramedWrite`](tokio_util::codec::FramedWrite) drives the
//! [`ResponseEncoder`] over the write half.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use probe_http::codec::HeaderDecoder;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = HeaderDecoder::new();
//! let mut buffer = BytesMut::from("GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n");
//! let head = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(head.target(), "/health");
//! ```

mod header_decoder;
mod response_encoder;

pub use header_decoder::DEFAULT_MAX_HEADER_BYTES;
pub use header_decoder::HeaderDecoder;
pub use response_encoder::ResponseEncoder;
pub use response_encoder::{ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN};
