//! Route table: registration, validation and best-match lookup.
//!
//! Routes are registered in [`RouteGroup`]s, each group carrying an optional path prefix and
//! the summary/tags shared by its routes. [`RouterBuilder::build`] compiles every template,
//! validates the declared parameters against it and sorts the table once by descending
//! segment count, so lookup is a linear scan picking the first match.
//!
//! ```
//! use probe_web::binder::ParamSpec;
//! use probe_web::handler_fn;
//! use probe_web::router::{Router, RouteGroup, get};
//! use http::Method;
//!
//! async fn echo(text: String) -> String {
//!     text
//! }
//!
//! let router = Router::builder()
//!     .group(RouteGroup::with_prefix("/api").route("/echo/{text}", get(handler_fn(echo)).param(ParamSpec::path::<String>("text"))))
//!     .build()
//!     .unwrap();
//!
//! let matched = router.at(&Method::GET, "/api/echo/hello").unwrap();
//! assert_eq!(matched.params.get("text"), Some("hello"));
//! ```

mod template;

pub use template::normalize_path;

use std::fmt;
use std::sync::Arc;

use http::{Method, StatusCode};
use regex::Regex;
use tracing::debug;

use crate::binder::{ParamOrigin, ParamSpec};
use crate::error::RouteError;
use crate::handler::RouteHandler;
use crate::openapi::{OpenApiDocument, OpenApiEndpoint, OpenApiInfo};
use crate::request::PathParams;
use crate::responder::ReturnDoc;
use crate::shape::{Describe, Shape};

/// A documented response of an operation, overriding the one derived from the handler.
#[derive(Debug, Clone)]
pub struct ResponseDoc {
    pub status: StatusCode,
    pub description: String,
    pub body: Option<Shape>,
}

impl ResponseDoc {
    pub fn new(status: StatusCode, description: impl Into<String>) -> Self {
        Self { status, description: description.into(), body: None }
    }

    /// A response without description, documented as `HTTP <status>`.
    pub fn status(status: StatusCode) -> Self {
        Self::new(status, format!("HTTP {}", status.as_u16()))
    }

    pub fn with_body<T: Describe>(mut self) -> Self {
        self.body = Some(T::shape());
        self
    }
}

/// One verb of a route: the handler and everything describing it.
pub struct RouteItem {
    method: Method,
    handler: Arc<dyn RouteHandler>,
    params: Vec<ParamSpec>,
    summary: Option<String>,
    tags: Vec<String>,
    responses: Vec<ResponseDoc>,
}

impl RouteItem {
    pub fn new<H: RouteHandler + 'static>(method: Method, handler: H) -> Self {
        Self::from_arc(method, Arc::new(handler))
    }

    pub fn from_arc(method: Method, handler: Arc<dyn RouteHandler>) -> Self {
        Self { method, handler, params: Vec::new(), summary: None, tags: Vec::new(), responses: Vec::new() }
    }

    /// Declares the next handler parameter. Parameters are bound in declaration order.
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = ParamSpec>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn response(mut self, response: ResponseDoc) -> Self {
        self.responses.push(response);
        self
    }
}

impl fmt::Debug for RouteItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteItem")
            .field("method", &self.method)
            .field("params", &self.params)
            .field("summary", &self.summary)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

macro_rules! method_route_item {
    ($name:ident, $method:expr) => {
        pub fn $name<H: RouteHandler + 'static>(handler: H) -> RouteItem {
            RouteItem::new($method, handler)
        }
    };
}

method_route_item!(get, Method::GET);
method_route_item!(post, Method::POST);
method_route_item!(put, Method::PUT);
method_route_item!(delete, Method::DELETE);
method_route_item!(patch, Method::PATCH);

/// Routes sharing a path prefix and documentation.
#[derive(Debug, Default)]
pub struct RouteGroup {
    prefix: String,
    summary: Option<String>,
    tags: Vec<String>,
    routes: Vec<(String, RouteItem)>,
}

impl RouteGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), ..Self::default() }
    }

    /// Summary of every route in the group that has none of its own.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Group tags replace the tags of the group's routes.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn route(mut self, template: impl Into<String>, item: RouteItem) -> Self {
        self.routes.push((template.into(), item));
        self
    }
}

/// A handler group bound to a pre-built instance.
///
/// ```
/// use std::sync::Arc;
/// use probe_web::handler_fn;
/// use probe_web::router::{Controller, RouteGroup, Router, get};
///
/// struct Version(&'static str);
///
/// impl Controller for Version {
///     fn group(self: Arc<Self>) -> RouteGroup {
///         RouteGroup::with_prefix("/version").route("/", get(handler_fn(move || {
///             let this = self.clone();
///             async move { this.0 }
///         })))
///     }
/// }
///
/// let router = Router::builder().controller(Arc::new(Version("1.0.0"))).build().unwrap();
/// assert_eq!(router.routes().len(), 1);
/// ```
pub trait Controller: Send + Sync + 'static {
    fn group(self: Arc<Self>) -> RouteGroup;
}

/// Everything known about a registered operation, shared by the dispatcher and the OpenAPI
/// generator.
#[derive(Debug, Clone)]
pub struct RouteMeta {
    pub method: Method,
    pub template: String,
    pub params: Vec<ParamSpec>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub responses: Vec<ResponseDoc>,
    pub return_doc: ReturnDoc,
}

/// A compiled, immutable route.
pub struct Route {
    meta: Arc<RouteMeta>,
    matcher: Regex,
    param_names: Vec<String>,
    segment_count: usize,
    handler: Arc<dyn RouteHandler>,
}

impl Route {
    fn compile(meta: Arc<RouteMeta>, handler: Arc<dyn RouteHandler>) -> Result<Self, RouteError> {
        let compiled = template::compile(&meta.template)?;

        if let Some(unknown) = meta
            .params
            .iter()
            .filter(|param| param.origin() == ParamOrigin::Path)
            .find(|param| !compiled.param_names.iter().any(|name| name.eq_ignore_ascii_case(param.name())))
        {
            return Err(RouteError::UnknownPathParameter {
                template: meta.template.clone(),
                parameter: unknown.name().to_string(),
            });
        }

        Ok(Self {
            meta,
            matcher: compiled.matcher,
            param_names: compiled.param_names,
            segment_count: compiled.segment_count,
            handler,
        })
    }

    pub fn method(&self) -> &Method {
        &self.meta.method
    }

    pub fn template(&self) -> &str {
        &self.meta.template
    }

    pub fn meta(&self) -> &RouteMeta {
        &self.meta
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.meta.params
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn handler(&self) -> &dyn RouteHandler {
        self.handler.as_ref()
    }

    fn captures(&self, path: &str) -> Option<PathParams> {
        let captures = self.matcher.captures(path)?;
        let params = self
            .param_names
            .iter()
            .zip(captures.iter().skip(1))
            .map(|(name, group)| (name.clone(), group.map(|m| m.as_str().to_string()).unwrap_or_default()))
            .collect();
        Some(PathParams::new(params))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", self.method())
            .field("template", &self.template())
            .field("segment_count", &self.segment_count)
            .finish_non_exhaustive()
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'router> {
    pub route: &'router Route,
    pub params: PathParams,
}

/// The route table.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
    metas: Vec<Arc<RouteMeta>>,
    openapi: Option<Arc<OpenApiEndpoint>>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Finds the most specific route for a verb and a decoded path.
    ///
    /// The table is ordered by descending segment count; routes with equal counts keep their
    /// registration order.
    pub fn at(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| route.method() == method)
            .find_map(|route| route.captures(path).map(|params| RouteMatch { route, params }))
    }

    /// Routes in lookup order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The cached OpenAPI endpoint, if one was registered.
    pub fn openapi_endpoint(&self) -> Option<&Arc<OpenApiEndpoint>> {
        self.openapi.as_ref()
    }

    /// Generates the OpenAPI document of every registered route, in registration order.
    pub fn openapi_document(&self, info: &OpenApiInfo) -> OpenApiDocument {
        OpenApiDocument::generate(info, self.metas.iter().map(Arc::as_ref))
    }
}

#[derive(Debug, Default)]
pub struct RouterBuilder {
    groups: Vec<RouteGroup>,
    openapi: Option<OpenApiInfo>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Registers a single route without prefix.
    pub fn route(self, template: impl Into<String>, item: RouteItem) -> Self {
        self.group(RouteGroup::new().route(template, item))
    }

    pub fn group(mut self, group: RouteGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn groups(mut self, groups: impl IntoIterator<Item = RouteGroup>) -> Self {
        self.groups.extend(groups);
        self
    }

    pub fn controller<C: Controller>(self, controller: Arc<C>) -> Self {
        self.group(controller.group())
    }

    /// Serves the OpenAPI document of this router as YAML at `info.path`.
    pub fn openapi(mut self, info: OpenApiInfo) -> Self {
        self.openapi = Some(info);
        self
    }

    pub fn build(self) -> Result<Router, RouteError> {
        let mut routes = Vec::new();

        for group in self.groups {
            for (template, item) in group.routes {
                let template = normalize_path(&group.prefix, &template);
                let declared = item.params.len();
                let arity = item.handler.arity();
                if arity != declared {
                    return Err(RouteError::ArityMismatch { method: item.method, template, arity, declared });
                }

                let meta = RouteMeta {
                    method: item.method,
                    template,
                    params: item.params,
                    summary: item.summary.or_else(|| group.summary.clone()),
                    tags: if group.tags.is_empty() { item.tags } else { group.tags.clone() },
                    responses: item.responses,
                    return_doc: item.handler.return_doc(),
                };
                debug!(method = %meta.method, template = %meta.template, "register route");
                routes.push(Route::compile(Arc::new(meta), item.handler)?);
            }
        }

        let mut metas = routes.iter().map(|route| Arc::clone(&route.meta)).collect::<Vec<_>>();

        let openapi = match self.openapi {
            Some(info) => {
                let meta = Arc::new(RouteMeta {
                    method: Method::GET,
                    template: normalize_path("", &info.path),
                    params: Vec::new(),
                    summary: Some("OpenAPI document".to_string()),
                    tags: Vec::new(),
                    responses: Vec::new(),
                    return_doc: ReturnDoc::Opaque,
                });
                metas.push(Arc::clone(&meta));

                let endpoint = Arc::new(OpenApiEndpoint::new(info, metas.clone()));
                routes.push(Route::compile(meta, Arc::clone(&endpoint).into_handler())?);
                Some(endpoint)
            }
            None => None,
        };

        // stable
        routes.sort_by(|a, b| b.segment_count.cmp(&a.segment_count));

        Ok(Router { routes, metas, openapi })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;

    async fn first(id: String) -> String {
        format!("first {id}")
    }

    async fn second(id: String) -> String {
        format!("second {id}")
    }

    async fn fixed() -> String {
        "fixed".to_string()
    }

    fn id() -> ParamSpec {
        ParamSpec::path::<String>("id")
    }

    fn matched_template(router: &Router, method: Method, path: &str) -> Option<String> {
        router.at(&method, path).map(|matched| matched.route.template().to_string())
    }

    #[test]
    fn prefix_and_template_are_joined() {
        let router = Router::builder()
            .group(RouteGroup::with_prefix("/api/").route("/users/{id}/", get(handler_fn(first)).param(id())))
            .build()
            .unwrap();

        let matched = router.at(&Method::GET, "/api/users/42").unwrap();
        assert_eq!(matched.route.template(), "/api/users/{id}");
        assert_eq!(matched.params.get("ID"), Some("42"));
    }

    #[test]
    fn more_segments_win() {
        let router = Router::builder()
            .route("/a/{id}", get(handler_fn(first)).param(id()))
            .route("/a/{id}/b", get(handler_fn(first)).param(id()))
            .build()
            .unwrap();

        assert_eq!(matched_template(&router, Method::GET, "/a/1/b").as_deref(), Some("/a/{id}/b"));
        assert_eq!(matched_template(&router, Method::GET, "/a/1").as_deref(), Some("/a/{id}"));
        assert_eq!(router.routes()[0].segment_count(), 3);
    }

    #[test]
    fn equal_segments_keep_registration_order() {
        let router = Router::builder()
            .route("/items/{id}", get(handler_fn(first)).param(id()))
            .route("/items/latest", get(handler_fn(fixed)))
            .build()
            .unwrap();

        // a literal is not more specific than a placeholder
        assert_eq!(matched_template(&router, Method::GET, "/items/latest").as_deref(), Some("/items/{id}"));
    }

    #[test]
    fn verb_must_match() {
        let router = Router::builder()
            .route("/items/{id}", get(handler_fn(first)).param(id()))
            .route("/items/{id}", delete(handler_fn(second)).param(id()))
            .build()
            .unwrap();

        assert!(router.at(&Method::POST, "/items/1").is_none());
        assert_eq!(router.at(&Method::DELETE, "/items/1").unwrap().route.method(), &Method::DELETE);
    }

    #[test]
    fn no_match() {
        let router = Router::builder().route("/health", get(handler_fn(fixed))).build().unwrap();
        assert!(router.at(&Method::GET, "/unregistered/path").is_none());
        assert!(router.at(&Method::GET, "/HEALTH").is_some());
    }

    #[test]
    fn summary_and_tags_resolution() {
        let router = Router::builder()
            .group(
                RouteGroup::with_prefix("/a")
                    .summary("group summary")
                    .route("/x", get(handler_fn(fixed)).summary("own summary").tag("own"))
                    .route("/y", get(handler_fn(fixed)).tag("own")),
            )
            .group(RouteGroup::with_prefix("/b").tag("group").route("/z", get(handler_fn(fixed)).tag("own")))
            .build()
            .unwrap();

        let meta = |path: &str| router.at(&Method::GET, path).unwrap().route.meta().clone();
        assert_eq!(meta("/a/x").summary.as_deref(), Some("own summary"));
        assert_eq!(meta("/a/y").summary.as_deref(), Some("group summary"));
        assert_eq!(meta("/a/y").tags, vec!["own"]);
        assert_eq!(meta("/b/z").tags, vec!["group"]);
    }

    #[test]
    fn unknown_path_parameter() {
        let result = Router::builder().route("/users/{id}", get(handler_fn(first)).param(ParamSpec::path::<String>("name"))).build();
        assert!(matches!(result, Err(RouteError::UnknownPathParameter { ref parameter, .. }) if parameter == "name"));
    }

    #[test]
    fn arity_mismatch() {
        let result = Router::builder().route("/users/{id}", get(handler_fn(first))).build();
        assert!(matches!(result, Err(RouteError::ArityMismatch { arity: 1, declared: 0, .. })));
    }

    #[test]
    fn controller_instance() {
        struct Greeter {
            greeting: String,
        }

        impl Controller for Greeter {
            fn group(self: Arc<Self>) -> RouteGroup {
                RouteGroup::with_prefix("greeter").route(
                    "hello",
                    get(handler_fn(move || {
                        let this = self.clone();
                        async move { this.greeting.clone() }
                    })),
                )
            }
        }

        let router = Router::builder().controller(Arc::new(Greeter { greeting: "hi".into() })).build().unwrap();
        assert_eq!(matched_template(&router, Method::GET, "/greeter/hello").as_deref(), Some("/greeter/hello"));
    }

    #[test]
    fn openapi_route_is_registered() {
        let router = Router::builder()
            .route("/health", get(handler_fn(fixed)))
            .openapi(OpenApiInfo::new("/openapi.yaml", "probe", "1.0.0"))
            .build()
            .unwrap();

        assert!(router.openapi_endpoint().is_some());
        assert_eq!(matched_template(&router, Method::GET, "/openapi.yaml").as_deref(), Some("/openapi.yaml"));
    }
}
