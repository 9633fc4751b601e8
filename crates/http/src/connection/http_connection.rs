use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, trace, warn};

use crate::codec::{DEFAULT_MAX_HEADER_BYTES, HeaderDecoder, ResponseEncoder};
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, RequestHead, Response, text_response};

/// Default upper bound for a declared `Content-Length`
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Per connection limits.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionConfig {
    pub max_header_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { max_header_bytes: DEFAULT_MAX_HEADER_BYTES, max_body_bytes: DEFAULT_MAX_BODY_BYTES }
    }
}

/// An HTTP connection carrying exactly one request/response exchange
///
/// `HttpConnection` handles the full lifecycle of an accepted connection:
/// - Reading and decoding the request head
/// - Reading the fixed-length request body
/// - Invoking the handler
/// - Writing the response and shutting the connection down
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
///
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, HeaderDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
    max_body_bytes: usize,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ConnectionConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: ConnectionConfig) -> Self {
        let decoder = HeaderDecoder::with_limit(config.max_header_bytes);
        Self {
            framed_read: FramedRead::with_capacity(reader, decoder, READ_BUFFER_SIZE),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Serves the single request of this connection.
    ///
    /// Protocol failures are answered where a response makes sense (400 for a malformed
    /// or truncated head, 413 for an oversized body) and then returned, so the caller can
    /// log them. An oversized head aborts the connection without writing anything.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        let head = match self.framed_read.next().await {
            Some(Ok(head)) => head,

            Some(Err(e @ ParseError::HeaderTooLarge { .. })) => {
                warn!(cause = %e, "request head too large, abort connection");
                return Err(e.into());
            }

            Some(Err(e)) => {
                debug!(cause = %e, "can't parse request head");
                self.send_response(text_response(StatusCode::BAD_REQUEST, "Bad Request")).await;
                self.shutdown().await;
                return Err(e.into());
            }

            None => {
                debug!("connection closed before a request arrived");
                self.send_response(text_response(StatusCode::BAD_REQUEST, "Bad Request")).await;
                self.shutdown().await;
                return Err(ParseError::ConnectionClosed.into());
            }
        };

        let content_length = head.content_length();
        if content_length > self.max_body_bytes {
            let e = ParseError::body_too_large(content_length, self.max_body_bytes);
            warn!(cause = %e, "reject request body");
            self.send_response(text_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")).await;
            self.shutdown().await;
            return Err(e.into());
        }

        let body = self.read_body(&head, content_length).await?;
        let response = handler.call(head.body(body)).await;

        self.send_response(response).await;
        self.shutdown().await;
        Ok(())
    }

    /// Reads exactly `length` body bytes, bytes already buffered behind the head first.
    ///
    /// A peer closing early leaves a partial body, which is used as is.
    async fn read_body(&mut self, head: &RequestHead, length: usize) -> Result<Bytes, HttpError> {
        if length == 0 {
            return Ok(Bytes::new());
        }

        let buffered = self.framed_read.read_buffer_mut();
        let from_buffer = buffered.len().min(length);
        let mut body = BytesMut::with_capacity(length);
        body.extend_from_slice(&buffered.split_to(from_buffer));

        let remaining = length - body.len();
        if remaining > 0 {
            let mut rest = Vec::with_capacity(remaining);
            let reader = self.framed_read.get_mut();
            reader.take(remaining as u64).read_to_end(&mut rest).await.map_err(ParseError::io)?;
            body.extend_from_slice(&rest);
        }

        if body.len() < length {
            debug!(path = head.path(), expected = length, received = body.len(), "peer closed during body, use partial body");
        } else {
            trace!(length, "read request body");
        }

        Ok(body.freeze())
    }

    /// Writes the response, a failing peer is not an error worth reporting.
    async fn send_response(&mut self, response: Response) {
        if let Err(e) = self.framed_write.send(response).await {
            debug!(cause = %e, "failed to write response");
        }
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.framed_write.get_mut().shutdown().await {
            debug!(cause = %e, "failed to shutdown connection");
        }
    }
}
