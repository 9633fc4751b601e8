use std::io;
use std::net::SocketAddr;

use http::Method;
use thiserror::Error;

/// A request value that could not be converted to its declared shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("can't bind parameter '{parameter}' from '{raw}' as {shape}")]
pub struct BindingError {
    pub parameter: String,
    pub raw: String,
    pub shape: String,
}

impl BindingError {
    pub fn new(parameter: impl Into<String>, raw: impl Into<String>, shape: impl ToString) -> Self {
        Self { parameter: parameter.into(), raw: raw.into(), shape: shape.to_string() }
    }
}

/// Failures between a parsed request and a handler result.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("no route found for {method} {path}")]
    NoRouteFound { method: Method, path: String },

    #[error("binding error: {source}")]
    Binding {
        #[from]
        source: BindingError,
    },

    #[error("handler error: {message}")]
    Handler { message: String },
}

impl DispatchError {
    pub fn no_route_found(method: &Method, path: impl Into<String>) -> Self {
        Self::NoRouteFound { method: method.clone(), path: path.into() }
    }

    pub fn handler<S: ToString>(message: S) -> Self {
        Self::Handler { message: message.to_string() }
    }
}

/// Rejected route registrations.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("invalid route template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("path parameter '{parameter}' is not a placeholder of '{template}'")]
    UnknownPathParameter { template: String, parameter: String },

    #[error("handler of {method} '{template}' takes {arity} arguments but {declared} parameters are declared")]
    ArityMismatch { method: Method, template: String, arity: usize, declared: usize },
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,

    #[error("invalid address '{address}': {source}")]
    InvalidAddress { address: String, source: io::Error },

    #[error("address resolves to no socket address: '{address}'")]
    NoAddress { address: String },
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("can't bind {addresses:?}: {source}")]
    Bind { addresses: Vec<SocketAddr>, source: io::Error },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}
