//! A minimal asynchronous HTTP/1.1 wire layer
//!
//! This crate parses a single request off a byte stream, hands it to a handler and writes
//! the response back. It is deliberately small: one request per connection, a fixed-length
//! body governed by `Content-Length`, a fully buffered response and `Connection: close`.
//! It serves low traffic control and diagnostic APIs, routing and argument binding live in
//! `probe-web`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use http::StatusCode;
//! use tokio::net::TcpListener;
//! use tracing::{info, warn};
//! use probe_http::connection::HttpConnection;
//! use probe_http::handler::make_handler;
//! use probe_http::protocol::{Request, Response, build_response};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let tcp_listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             if let Err(e) = HttpConnection::new(reader, writer).process(handler).await {
//!                 info!(cause = %e, "connection finished with error");
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request) -> Response {
//!     info!(path = request.head().path(), "receive request");
//!     build_response(StatusCode::OK, "text/plain; charset=utf-8", "Hello World!")
//! }
//! ```
//!
//! # Architecture
//!
//! - [`connection`]: owns one accepted connection end to end
//! - [`protocol`]: request, response and error types
//! - [`codec`]: the header decoder and response encoder
//! - [`handler`]: the handler trait the connection calls into
//!
//! # Error Handling
//!
//! - [`protocol::HttpError`]: Top-level error type
//! - [`protocol::ParseError`]: Request parsing errors
//! - [`protocol::SendError`]: Response sending errors
//!
//! # Limitations
//!
//! - HTTP/1.1 only, no keep-alive and no pipelining
//! - No chunked transfer encoding
//! - No TLS support (use a reverse proxy for HTTPS)
//! - Maximum header size: 64KB by default

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
