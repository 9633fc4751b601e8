//! OpenAPI 3.0 export of the route table.
//!
//! The document is derived from the same [`RouteMeta`](crate::router::RouteMeta) the
//! dispatcher uses, so it always describes what is actually served. It is available
//! programmatically through [`Router::openapi_document`](crate::router::Router::openapi_document),
//! or served as YAML by registering an endpoint with
//! [`RouterBuilder::openapi`](crate::router::RouterBuilder::openapi).

mod document;
mod endpoint;
mod schema;

pub use document::{
    Components, Info, MediaType, OPENAPI_VERSION, OpenApiDocument, Operation, Parameter, PathItem, RequestBody,
    ResponseObject,
};
pub use endpoint::{APPLICATION_YAML_UTF_8, OpenApiEndpoint};
pub use schema::{SCHEMA_REF_PREFIX, SchemaNode, SchemaRegistry};

use serde::Deserialize;

/// Where the document is served and how it is titled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OpenApiInfo {
    pub path: String,
    pub title: String,
    pub version: String,
}

impl OpenApiInfo {
    pub fn new(path: impl Into<String>, title: impl Into<String>, version: impl Into<String>) -> Self {
        Self { path: path.into(), title: title.into(), version: version.into() }
    }
}

impl Default for OpenApiInfo {
    fn default() -> Self {
        Self::new("/openapi.yaml", "API", "1.0.0")
    }
}
