//! Response handling module that converts handler results into HTTP responses.
//!
//! Handlers return any type implementing [`Responder`]. The responder turns the value into a
//! [`Reply`] and also tells the OpenAPI generator what the handler returns, see
//! [`ReturnDoc`].
//!
//! - [`ContentResult`]: a pre-formatted body written verbatim with its own status and type
//! - `String` / `&'static str`: `200`, `text/plain; charset=utf-8`
//! - `()`: `204` with an empty body
//! - [`Json<T>`], numbers, booleans, vectors: serialized with `serde_json`, `200`,
//!   `application/json; charset=utf-8`
//! - `Result<T, E>`: `Ok` responds as `T`, `Err` becomes a handler error

use std::fmt::Display;

use bytes::Bytes;
use http::StatusCode;
use probe_http::protocol::{Response, build_response};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::DispatchError;
use crate::shape::{Describe, Shape};

pub const TEXT_PLAIN_UTF_8: &str = "text/plain; charset=utf-8";
pub const APPLICATION_JSON_UTF_8: &str = "application/json; charset=utf-8";

/// A raw response: status, content type and body are written as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentResult {
    pub content: Bytes,
    pub content_type: String,
    pub status: StatusCode,
}

impl ContentResult {
    pub fn new(content: impl Into<Bytes>, content_type: impl Into<String>, status: StatusCode) -> Self {
        Self { content: content.into(), content_type: content_type.into(), status }
    }
}

/// Serializes the wrapped value as the JSON response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

/// The outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Content(ContentResult),
    Text(String),
    Json(String),
    NoContent,
}

impl Reply {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, DispatchError> {
        serde_json::to_string(value).map(Reply::Json).map_err(DispatchError::handler)
    }

    pub fn into_response(self) -> Response {
        match self {
            Reply::Content(content) => build_response(content.status, &content.content_type, content.content),
            Reply::Text(text) => build_response(StatusCode::OK, TEXT_PLAIN_UTF_8, text),
            Reply::Json(json) => build_response(StatusCode::OK, APPLICATION_JSON_UTF_8, json),
            Reply::NoContent => build_response(StatusCode::NO_CONTENT, TEXT_PLAIN_UTF_8, Bytes::new()),
        }
    }
}

/// What a handler responds with, as far as the documentation is concerned.
#[derive(Debug, Clone)]
pub enum ReturnDoc {
    /// `204 No Content`
    NoContent,
    /// `200 OK` whose body shape is not known up front
    Opaque,
    /// `200 OK` with a body of this shape
    Body(Shape),
}

/// A trait for types that can be returned from handlers.
pub trait Responder {
    fn into_reply(self) -> Result<Reply, DispatchError>;

    fn return_doc() -> ReturnDoc;
}

impl Responder for Reply {
    fn into_reply(self) -> Result<Reply, DispatchError> {
        Ok(self)
    }

    fn return_doc() -> ReturnDoc {
        ReturnDoc::Opaque
    }
}

impl Responder for ContentResult {
    fn into_reply(self) -> Result<Reply, DispatchError> {
        Ok(Reply::Content(self))
    }

    fn return_doc() -> ReturnDoc {
        ReturnDoc::Opaque
    }
}

impl Responder for String {
    fn into_reply(self) -> Result<Reply, DispatchError> {
        Ok(Reply::Text(self))
    }

    fn return_doc() -> ReturnDoc {
        ReturnDoc::Body(String::shape())
    }
}

impl Responder for &'static str {
    fn into_reply(self) -> Result<Reply, DispatchError> {
        Ok(Reply::Text(self.to_string()))
    }

    fn return_doc() -> ReturnDoc {
        ReturnDoc::Body(String::shape())
    }
}

/// Answers `200` with a JSON `null`, the document still lists it as `204`.
impl Responder for () {
    fn into_reply(self) -> Result<Reply, DispatchError> {
        Ok(Reply::Json("null".to_string()))
    }

    fn return_doc() -> ReturnDoc {
        ReturnDoc::NoContent
    }
}

impl<T: Serialize + Describe> Responder for Json<T> {
    fn into_reply(self) -> Result<Reply, DispatchError> {
        Reply::json(&self.0)
    }

    fn return_doc() -> ReturnDoc {
        ReturnDoc::Body(T::shape())
    }
}

impl<T: Serialize + Describe> Responder for Vec<T> {
    fn into_reply(self) -> Result<Reply, DispatchError> {
        Reply::json(&self)
    }

    fn return_doc() -> ReturnDoc {
        ReturnDoc::Body(Self::shape())
    }
}

impl Responder for Value {
    fn into_reply(self) -> Result<Reply, DispatchError> {
        Reply::json(&self)
    }

    fn return_doc() -> ReturnDoc {
        ReturnDoc::Opaque
    }
}

/// Implementation for Result allows handlers to return Result types directly.
/// The error is reported as a handler failure.
impl<T: Responder, E: Display> Responder for Result<T, E> {
    fn into_reply(self) -> Result<Reply, DispatchError> {
        match self {
            Ok(t) => t.into_reply(),
            Err(e) => Err(DispatchError::handler(e)),
        }
    }

    fn return_doc() -> ReturnDoc {
        T::return_doc()
    }
}

macro_rules! impl_responder_for_json_scalar {
    ($($ty:ty),+) => {
        $(
            impl Responder for $ty {
                fn into_reply(self) -> Result<Reply, DispatchError> {
                    Reply::json(&self)
                }

                fn return_doc() -> ReturnDoc {
                    ReturnDoc::Body(<$ty>::shape())
                }
            }
        )+
    };
}

impl_responder_for_json_scalar!(bool, i8, i16, i32, i64, u8, u16, u32, u64, isize, usize, f32, f64, Uuid);
