//! HTTP response type used by handlers.
//!
//! Responses are always fully buffered: there is no streaming body, so the
//! encoder can compute `Content-Length` from the bytes it is handed.

use bytes::Bytes;
use http::{HeaderValue, StatusCode, header};

/// A complete response, status and headers plus the buffered body.
pub type Response = http::Response<Bytes>;

/// Builds a response with the given status, content type and body.
///
/// An unrepresentable content type falls back to `text/plain`.
pub fn build_response(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> Response {
    let content_type =
        HeaderValue::from_str(content_type).unwrap_or_else(|_| HeaderValue::from_static(mime::TEXT_PLAIN.as_ref()));

    let mut response = http::Response::new(body.into());
    *response.status_mut() = status;
    response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    response
}

/// Builds a `text/plain` response, used for protocol level failures.
pub fn text_response(status: StatusCode, text: &'static str) -> Response {
    build_response(status, mime::TEXT_PLAIN.as_ref(), Bytes::from_static(text.as_bytes()))
}
