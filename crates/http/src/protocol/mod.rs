//! Core HTTP protocol abstractions.
//!
//! This module holds the plain data types exchanged between the codec, the
//! connection and request handlers.
//!
//! - **Request Processing** ([`request`]): [`RequestHead`] as parsed off the wire
//!   and [`Request`], the head plus its fixed-length body
//! - **Response Processing** ([`response`]): the fully buffered [`Response`]
//!   and small builders for protocol level replies
//! - **Error Handling** ([`error`]):
//!   - [`HttpError`]: Top-level error type
//!   - [`ParseError`]: Request parsing errors
//!   - [`SendError`]: Response sending errors

mod request;
pub use request::Request;
pub use request::RequestHead;

mod response;
pub use response::Response;
pub use response::build_response;
pub use response::text_response;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
