use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    HeaderTooLarge { current_size: usize, max_size: usize },

    #[error("bad request line: {reason}")]
    BadRequestLine { reason: String },

    #[error("connection closed before the request header was complete")]
    ConnectionClosed,

    #[error("body size too large, content-length: {length} exceed the limit {max_size}")]
    BodyTooLarge { length: usize, max_size: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn header_too_large(current_size: usize, max_size: usize) -> Self {
        Self::HeaderTooLarge { current_size, max_size }
    }

    pub fn bad_request_line<S: ToString>(str: S) -> Self {
        Self::BadRequestLine { reason: str.to_string() }
    }

    pub fn body_too_large(length: usize, max_size: usize) -> Self {
        Self::BodyTooLarge { length, max_size }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
