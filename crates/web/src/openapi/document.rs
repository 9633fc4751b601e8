//! The OpenAPI 3.0 document model and its generation from route metadata.
//!
//! Paths keep registration order. Every object type met while describing parameters and
//! responses lands once under `components/schemas` and is referenced from there.

use serde::Serialize;

use super::OpenApiInfo;
use super::schema::{SchemaNode, SchemaRegistry, serialize_ordered};
use crate::binder::{ParamOrigin, ParamSpec};
use crate::responder::ReturnDoc;
use crate::router::RouteMeta;
use crate::shape::Shape;

pub const OPENAPI_VERSION: &str = "3.0.3";

/// An OpenAPI 3.0 document.
#[derive(Debug, Clone, Serialize)]
pub struct OpenApiDocument {
    pub openapi: &'static str,
    pub info: Info,
    #[serde(serialize_with = "serialize_ordered")]
    pub paths: Vec<(String, PathItem)>,
    pub components: Components,
}

#[derive(Debug, Clone, Serialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

/// The operations of one path, keyed by lowercase verb.
#[derive(Debug, Clone, Default)]
pub struct PathItem {
    pub operations: Vec<(String, Operation)>,
}

impl Serialize for PathItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_ordered(&self.operations, serializer)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(serialize_with = "serialize_ordered")]
    pub responses: Vec<(String, ResponseObject)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: SchemaNode,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestBody {
    pub required: bool,
    #[serde(serialize_with = "serialize_ordered")]
    pub content: Vec<(String, MediaType)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseObject {
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "serialize_ordered")]
    pub content: Vec<(String, MediaType)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaType {
    pub schema: SchemaNode,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Components {
    #[serde(serialize_with = "serialize_ordered")]
    pub schemas: Vec<(String, SchemaNode)>,
}

impl OpenApiDocument {
    /// Builds the document of the given routes, in the given order.
    ///
    /// A path and verb registered twice keeps the later operation.
    pub fn generate<'a>(info: &OpenApiInfo, routes: impl IntoIterator<Item = &'a RouteMeta>) -> Self {
        let mut registry = SchemaRegistry::new();
        let mut paths: Vec<(String, PathItem)> = Vec::new();

        for meta in routes {
            let operation = operation(&mut registry, meta);
            let verb = meta.method.as_str().to_ascii_lowercase();

            let index = match paths.iter().position(|(path, _)| *path == meta.template) {
                Some(index) => index,
                None => {
                    paths.push((meta.template.clone(), PathItem::default()));
                    paths.len() - 1
                }
            };
            let operations = &mut paths[index].1.operations;
            match operations.iter_mut().find(|(existing, _)| *existing == verb) {
                Some(existing) => existing.1 = operation,
                None => operations.push((verb, operation)),
            }
        }

        Self {
            openapi: OPENAPI_VERSION,
            info: Info { title: info.title.clone(), version: info.version.clone() },
            paths,
            components: Components { schemas: registry.into_schemas() },
        }
    }

    /// Renders the document as YAML.
    pub fn to_yaml(&self) -> Result<String, serde_json::Error> {
        crate::yaml::to_string(self)
    }
}

fn operation(registry: &mut SchemaRegistry, meta: &RouteMeta) -> Operation {
    let mut parameters = Vec::new();
    let mut request_body = None;

    for param in &meta.params {
        match param.origin() {
            ParamOrigin::Body => {
                if request_body.is_none() {
                    request_body = Some(RequestBody {
                        required: true,
                        content: vec![(mime::APPLICATION_JSON.essence_str().to_string(), media(registry, param.shape()))],
                    });
                }
            }
            ParamOrigin::Path | ParamOrigin::Query => parameters.push(parameter(registry, param)),
        }
    }

    Operation {
        summary: non_blank(meta.summary.as_deref()),
        tags: meta.tags.clone(),
        parameters,
        request_body,
        responses: responses(registry, meta),
    }
}

fn parameter(registry: &mut SchemaRegistry, param: &ParamSpec) -> Parameter {
    Parameter {
        name: param.name().to_string(),
        location: param.origin().as_str(),
        required: param.is_required(),
        description: non_blank(param.description_text()),
        schema: registry.resolve(param.shape()),
    }
}

fn responses(registry: &mut SchemaRegistry, meta: &RouteMeta) -> Vec<(String, ResponseObject)> {
    if !meta.responses.is_empty() {
        return meta
            .responses
            .iter()
            .map(|doc| {
                let code = doc.status.as_u16();
                let description = non_blank(Some(&doc.description)).unwrap_or_else(|| format!("HTTP {code}"));
                let content = match &doc.body {
                    Some(shape) => vec![(mime::APPLICATION_JSON.essence_str().to_string(), media(registry, shape))],
                    None => Vec::new(),
                };
                (code.to_string(), ResponseObject { description, content })
            })
            .collect();
    }

    let response = match &meta.return_doc {
        ReturnDoc::NoContent => {
            return vec![("204".to_string(), ResponseObject { description: "No Content".to_string(), content: Vec::new() })];
        }
        ReturnDoc::Opaque => ResponseObject { description: "OK".to_string(), content: Vec::new() },
        ReturnDoc::Body(shape) => {
            let media_type = if shape.is_text() { mime::TEXT_PLAIN } else { mime::APPLICATION_JSON };
            ResponseObject { description: "OK".to_string(), content: vec![(media_type.essence_str().to_string(), media(registry, shape))] }
        }
    };
    vec![("200".to_string(), response)]
}

fn media(registry: &mut SchemaRegistry, shape: &Shape) -> MediaType {
    MediaType { schema: registry.resolve(shape) }
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.filter(|text| !text.trim().is_empty()).map(str::to_string)
}
