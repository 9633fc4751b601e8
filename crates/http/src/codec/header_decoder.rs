//! HTTP header decoder implementation for parsing HTTP request heads
//!
//! This module turns the raw bytes of a connection into a [`RequestHead`]. Bytes are
//! accumulated by a [`FramedRead`](tokio_util::codec::FramedRead) into a bounded buffer
//! until the `\r\n\r\n` terminator shows up; only then is the head parsed.
//!
//! # States
//!
//! - accumulating: the terminator has not been seen, more bytes are needed
//! - header-complete: the terminator was found inside the byte limit
//! - parsed / failed: the request line and header lines were (or could not be) parsed
//!
//! # Limits
//!
//! - Maximum header size: 64KB by default, see [`HeaderDecoder::with_limit`]
//!
//! # Implementation Details
//!
//! The terminator scan is incremental: each call resumes three bytes before the point
//! where the previous scan stopped, so a terminator split across two reads is still found
//! while no byte is scanned more than a constant number of times.
//!
//! The request line is split at the first two single spaces into method, target and
//! version. Header lines are split at their first colon; both sides are trimmed of spaces
//! and tabs.

use bytes::BytesMut;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, RequestHead};

/// Maximum size in bytes allowed for the entire header section
pub const DEFAULT_MAX_HEADER_BYTES: usize = 64 * 1024;

const TERMINATOR: &[u8] = b"\r\n\r\n";

/// Decoder for HTTP request heads implementing the [`Decoder`] trait.
#[derive(Debug)]
pub struct HeaderDecoder {
    max_header_bytes: usize,
    /// How far the buffer has already been searched for the terminator.
    scanned: usize,
}

impl HeaderDecoder {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_HEADER_BYTES)
    }

    /// Creates a decoder that fails with [`ParseError::HeaderTooLarge`] once `max_header_bytes`
    /// are buffered without a complete head.
    pub fn with_limit(max_header_bytes: usize) -> Self {
        Self { max_header_bytes, scanned: 0 }
    }

    pub fn max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for HeaderDecoder {
    type Item = RequestHead;
    type Error = ParseError;

    /// Attempts to decode a request head from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(head))` once the terminator was found and the head parsed, the head
    ///   bytes are split off `src` so only body bytes remain
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if the limit was reached or the request line is malformed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // only the first `max_header_bytes` may hold the head
        let window = src.len().min(self.max_header_bytes);
        let scan_from = self.scanned.saturating_sub(TERMINATOR.len() - 1);

        match find_terminator(&src[..window], scan_from) {
            Some(terminator_at) => {
                let head_end = terminator_at + TERMINATOR.len();
                trace!(head_size = head_end, "found end of request head");
                self.scanned = 0;

                let head_bytes = src.split_to(head_end);
                parse_head(&head_bytes).map(Some)
            }
            None => {
                ensure!(src.len() < self.max_header_bytes, ParseError::header_too_large(src.len(), self.max_header_bytes));
                self.scanned = window;
                Ok(None)
            }
        }
    }

    /// Called once the peer stopped sending; a head that is still incomplete means the
    /// connection closed under us.
    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(head) => Ok(Some(head)),
            None => Err(ParseError::ConnectionClosed),
        }
    }
}

/// Searches `bytes[start..]` for `\r\n\r\n`, returning the index of its first byte.
fn find_terminator(bytes: &[u8], start: usize) -> Option<usize> {
    if start >= bytes.len() {
        return None;
    }

    bytes[start..].windows(TERMINATOR.len()).position(|window| window == TERMINATOR).map(|offset| start + offset)
}

/// Parses a complete head, the slice ends with the `\r\n\r\n` terminator.
fn parse_head(bytes: &[u8]) -> Result<RequestHead, ParseError> {
    let mut lines = bytes.split(|b| *b == b'\n').map(|line| line.strip_suffix(b"\r").unwrap_or(line));

    let request_line = lines.next().unwrap_or_default();
    let (method, target, version) = parse_request_line(request_line)?;

    let mut headers = HeaderMap::new();
    for line in lines.take_while(|line| !line.is_empty()) {
        parse_header_line(line, &mut headers);
    }

    Ok(RequestHead::new(method, target, version, headers))
}

/// Splits `METHOD SP TARGET SP VERSION`, only the first two spaces matter.
fn parse_request_line(line: &[u8]) -> Result<(Method, String, String), ParseError> {
    ensure!(!line.is_empty(), ParseError::bad_request_line("empty request line"));

    let first_space = line.iter().position(|b| *b == b' ').ok_or_else(|| ParseError::bad_request_line("missing request target"))?;
    ensure!(first_space > 0, ParseError::bad_request_line("missing method"));

    let rest = &line[first_space + 1..];
    let second_space = rest.iter().position(|b| *b == b' ').ok_or_else(|| ParseError::bad_request_line("missing http version"))?;

    let method = Method::from_bytes(&line[..first_space].to_ascii_uppercase())
        .map_err(|e| ParseError::bad_request_line(format!("invalid method: {e}")))?;
    let target = String::from_utf8_lossy(&rest[..second_space]).into_owned();
    let version = String::from_utf8_lossy(&rest[second_space + 1..]).into_owned();

    Ok((method, target, version))
}

/// Splits a header line at its first colon and records it, malformed lines are skipped.
fn parse_header_line(line: &[u8], headers: &mut HeaderMap) {
    let Some(colon) = line.iter().position(|b| *b == b':') else {
        trace!(line = %String::from_utf8_lossy(line), "skip header line without colon");
        return;
    };

    let key = trim_horizontal_whitespace(&line[..colon]);
    let value = trim_horizontal_whitespace(&line[colon + 1..]);
    if key.is_empty() {
        return;
    }

    match (HeaderName::from_bytes(key), HeaderValue::from_bytes(value)) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => trace!(line = %String::from_utf8_lossy(line), "skip header line with illegal name or value"),
    }
}

fn trim_horizontal_whitespace(bytes: &[u8]) -> &[u8] {
    let is_blank = |b: &u8| *b == b' ' || *b == b'\t';
    let start = bytes.iter().position(|b| !is_blank(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !is_blank(b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}
