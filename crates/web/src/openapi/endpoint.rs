use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::info;

use super::{OpenApiDocument, OpenApiInfo};
use crate::binder::ParamSpec;
use crate::error::DispatchError;
use crate::handler::RouteHandler;
use crate::responder::{ContentResult, Reply, ReturnDoc};
use crate::router::RouteMeta;

pub const APPLICATION_YAML_UTF_8: &str = "application/yaml; charset=utf-8";

/// Serves the YAML document of a route table, generated once on first use.
///
/// Concurrent first requests wait for a single generation and all receive the same buffer.
#[derive(Debug)]
pub struct OpenApiEndpoint {
    info: OpenApiInfo,
    routes: Vec<Arc<RouteMeta>>,
    cached: ArcSwapOption<Bytes>,
    generating: Mutex<()>,
    generations: AtomicUsize,
}

impl OpenApiEndpoint {
    pub fn new(info: OpenApiInfo, routes: Vec<Arc<RouteMeta>>) -> Self {
        Self { info, routes, cached: ArcSwapOption::empty(), generating: Mutex::new(()), generations: AtomicUsize::new(0) }
    }

    pub fn info(&self) -> &OpenApiInfo {
        &self.info
    }

    pub fn document(&self) -> OpenApiDocument {
        OpenApiDocument::generate(&self.info, self.routes.iter().map(Arc::as_ref))
    }

    /// The cached YAML, generating it if needed.
    pub async fn yaml(&self) -> Result<Bytes, DispatchError> {
        if let Some(yaml) = self.cached.load_full() {
            return Ok(Bytes::clone(&yaml));
        }

        let _guard = self.generating.lock().await;
        if let Some(yaml) = self.cached.load_full() {
            return Ok(Bytes::clone(&yaml));
        }

        let yaml = Bytes::from(self.document().to_yaml().map_err(DispatchError::handler)?);
        self.generations.fetch_add(1, Ordering::Relaxed);
        info!(path = %self.info.path, bytes = yaml.len(), "openapi document generated");

        self.cached.store(Some(Arc::new(yaml.clone())));
        Ok(yaml)
    }

    /// Drops the cached document, the next request generates it again.
    pub fn invalidate(&self) {
        self.cached.store(None);
    }

    /// How often the document has been generated.
    pub fn generations(&self) -> usize {
        self.generations.load(Ordering::Relaxed)
    }

    pub(crate) fn into_handler(self: Arc<Self>) -> Arc<dyn RouteHandler> {
        Arc::new(OpenApiHandler { endpoint: self })
    }
}

#[derive(Debug)]
struct OpenApiHandler {
    endpoint: Arc<OpenApiEndpoint>,
}

#[async_trait]
impl RouteHandler for OpenApiHandler {
    async fn invoke(&self, _args: Vec<Value>, _params: &[ParamSpec]) -> Result<Reply, DispatchError> {
        let yaml = self.endpoint.yaml().await?;
        Ok(Reply::Content(ContentResult::new(yaml, APPLICATION_YAML_UTF_8, StatusCode::OK)))
    }

    fn arity(&self) -> usize {
        0
    }

    fn return_doc(&self) -> ReturnDoc {
        ReturnDoc::Opaque
    }
}
