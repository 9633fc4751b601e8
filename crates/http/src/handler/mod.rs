//! Request handler abstraction used by [`HttpConnection`](crate::connection::HttpConnection).
//!
//! A handler receives a fully read [`Request`] and always produces a [`Response`]:
//! application failures are expected to be mapped to an error response by the handler
//! itself, the connection only reports protocol level failures.

use std::future::Future;

use async_trait::async_trait;

use crate::protocol::{Request, Response};

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: Request) -> Response;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send,
{
    async fn call(&self, request: Request) -> Response {
        (self.f)(request).await
    }
}

/// Wraps an async function into a [`Handler`].
pub fn make_handler<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut,
    Fut: Future<Output = Response>,
{
    HandlerFn { f }
}
