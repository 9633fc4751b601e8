//! Glue between a parsed request and the route table.
//!
//! [`Dispatcher`] is the [`Handler`] every connection hands its request to. It splits the
//! target, percent-decodes the path, finds the route, binds the arguments and invokes
//! the handler. Every failure is turned into a response here, so the transport never sees an
//! application error.

use async_trait::async_trait;
use http::{Method, StatusCode};
use probe_http::handler::Handler;
use probe_http::protocol::{Request, Response, build_response, text_response};
use tracing::{debug, error};

use crate::binder::bind_arguments;
use crate::error::DispatchError;
use crate::request::{QueryParams, percent_decode};
use crate::responder::{Reply, TEXT_PLAIN_UTF_8};
use crate::router::Router;

const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Routes requests to the handlers of a [`Router`].
#[derive(Debug)]
pub struct Dispatcher {
    router: Router,
    expose_error_details: bool,
}

impl Dispatcher {
    pub fn new(router: Router) -> Self {
        Self { router, expose_error_details: false }
    }

    /// Whether a 500 body carries the error message, off by default.
    pub fn expose_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Runs the request through the route table without mapping failures to responses.
    pub async fn dispatch(&self, request: &Request) -> Result<Reply, DispatchError> {
        let head = request.head();
        let path = request_path(head.path());

        let matched =
            self.router.at(head.method(), &path).ok_or_else(|| DispatchError::no_route_found(head.method(), path.as_str()))?;

        let params = matched.route.params();
        let query = QueryParams::parse(head.query());
        let args = bind_arguments(params, &matched.params, &query, request.body())?;

        matched.route.handler().invoke(args, params).await
    }

    fn error_response(&self, method: &Method, path: &str, error: &DispatchError) -> Response {
        match error {
            DispatchError::NoRouteFound { .. } if method == Method::OPTIONS => {
                debug!(%method, path, "preflight request");
                text_response(StatusCode::NO_CONTENT, "")
            }
            DispatchError::NoRouteFound { .. } => {
                debug!(%method, path, "no route found");
                text_response(StatusCode::NOT_FOUND, "Not Found")
            }
            DispatchError::Binding { .. } | DispatchError::Handler { .. } => {
                error!(%method, path, cause = %error, "request failed");
                if self.expose_error_details {
                    build_response(StatusCode::INTERNAL_SERVER_ERROR, TEXT_PLAIN_UTF_8, format!("{INTERNAL_SERVER_ERROR}: {error}"))
                } else {
                    text_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
                }
            }
        }
    }
}

#[async_trait]
impl Handler for Dispatcher {
    async fn call(&self, request: Request) -> Response {
        let response = match self.dispatch(&request).await {
            Ok(reply) => reply.into_response(),
            Err(e) => self.error_response(request.method(), request.head().path(), &e),
        };

        debug!(method = %request.method(), path = request.head().path(), status = response.status().as_u16(), "request served");
        response
    }
}

/// The decoded path used for routing, `/` when the target has none.
fn request_path(raw: &str) -> String {
    let decoded = percent_decode(raw);
    if decoded.is_empty() { "/".to_string() } else { decoded.into_owned() }
}
