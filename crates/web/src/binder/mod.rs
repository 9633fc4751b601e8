//! Argument binding: from raw request data to the JSON values of declared parameters.
//!
//! Every handler declares its parameters as a list of [`ParamSpec`]s, in call order. For
//! each parameter [`bind_arguments`] picks its value by origin:
//!
//! - `body`: the request body parsed as JSON, an empty body yields the zero value
//! - `path`: the text captured by the route placeholder of the same name, URL-decoded
//! - `query`: the query value of the same name, last occurrence wins
//!
//! A parameter nobody supplied takes its declared default, else its shape's zero value.
//! The resulting values are then turned into the handler's typed tuple by [`FromArgs`].

mod convert;
mod from_args;

pub use convert::convert_text;
pub use convert::parse_timestamp;
pub use from_args::FromArgs;

use std::borrow::Cow;

use serde_json::Value;
use tracing::trace;

use crate::error::BindingError;
use crate::request::{PathParams, QueryParams, percent_decode};
use crate::shape::{Describe, Shape};

const MAX_RAW_IN_ERROR: usize = 256;

/// Where a parameter's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamOrigin {
    Path,
    Query,
    Body,
}

impl ParamOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamOrigin::Path => "path",
            ParamOrigin::Query => "query",
            ParamOrigin::Body => "body",
        }
    }
}

/// A declared handler parameter.
///
/// ```
/// use probe_web::binder::ParamSpec;
///
/// let times = ParamSpec::query::<i32>("times").default_value(1).description("how often to repeat");
/// assert!(!times.is_required());
/// ```
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: String,
    shape: Shape,
    origin: ParamOrigin,
    default: Option<Value>,
    required: Option<bool>,
    description: Option<String>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, shape: Shape, origin: ParamOrigin) -> Self {
        Self { name: name.into(), shape, origin, default: None, required: None, description: None }
    }

    /// A parameter captured by the `{name}` placeholder of the route template.
    pub fn path<T: Describe>(name: impl Into<String>) -> Self {
        Self::new(name, T::shape(), ParamOrigin::Path)
    }

    /// A parameter read from the query string.
    pub fn query<T: Describe>(name: impl Into<String>) -> Self {
        Self::new(name, T::shape(), ParamOrigin::Query)
    }

    /// A parameter deserialized from the JSON request body.
    pub fn body<T: Describe>(name: impl Into<String>) -> Self {
        Self::new(name, T::shape(), ParamOrigin::Body)
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides whether a query parameter is documented as required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn origin(&self) -> ParamOrigin {
        self.origin
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Path and body parameters are always required, a query parameter is required unless it
    /// has a default or a nullable shape.
    pub fn is_required(&self) -> bool {
        match self.origin {
            ParamOrigin::Path | ParamOrigin::Body => true,
            ParamOrigin::Query => self.required.unwrap_or(self.default.is_none() && !self.shape.is_nullable()),
        }
    }

    fn fallback(&self) -> Value {
        self.default.clone().unwrap_or_else(|| self.shape.zero_value())
    }
}

/// Binds every declared parameter, in order, to a JSON value.
pub fn bind_arguments(
    params: &[ParamSpec],
    path_params: &PathParams,
    query: &QueryParams,
    body: &[u8],
) -> Result<Vec<Value>, BindingError> {
    params
        .iter()
        .map(|param| {
            let raw = match param.origin {
                ParamOrigin::Body => return bind_body(param, body),
                // captures come from the already decoded path and are decoded again
                ParamOrigin::Path => path_params.get(&param.name).map(percent_decode),
                ParamOrigin::Query => query.get(&param.name).map(Cow::Borrowed),
            };

            match raw {
                Some(raw) => convert_text(&param.name, &raw, &param.shape),
                None => {
                    trace!(parameter = %param.name, "no value supplied, use fallback");
                    Ok(param.fallback())
                }
            }
        })
        .collect()
}

fn bind_body(param: &ParamSpec, body: &[u8]) -> Result<Value, BindingError> {
    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        return Ok(param.fallback());
    }

    serde_json::from_str::<Value>(&text).map_err(|e| {
        trace!(parameter = %param.name, cause = %e, "invalid json body");
        let raw = text.chars().take(MAX_RAW_IN_ERROR).collect::<String>();
        BindingError::new(&param.name, raw, &param.shape)
    })
}
