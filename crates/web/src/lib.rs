//! Route table, typed argument binding and OpenAPI export on top of `probe-http`.
//!
//! Handlers are plain async functions. Their parameters are declared next to the route, so
//! the same declaration drives argument binding and the generated OpenAPI document:
//!
//! ```no_run
//! use probe_web::binder::ParamSpec;
//! use probe_web::openapi::OpenApiInfo;
//! use probe_web::router::{RouteGroup, get};
//! use probe_web::{Router, Server, handler_fn};
//!
//! async fn echo(text: String, times: i32) -> String {
//!     text.repeat(usize::try_from(times.max(1)).unwrap_or(1))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = Router::builder()
//!         .group(
//!             RouteGroup::with_prefix("/api").tag("sample").route(
//!                 "/echo/{text}",
//!                 get(handler_fn(echo))
//!                     .param(ParamSpec::path::<String>("text"))
//!                     .param(ParamSpec::query::<i32>("times").default_value(1)),
//!             ),
//!         )
//!         .openapi(OpenApiInfo::new("/openapi.yaml", "Sample API", "1.0.0"))
//!         .build()?;
//!
//!     let handle = Server::builder().address("127.0.0.1:8080").router(router).build()?.start().await?;
//!     tokio::signal::ctrl_c().await?;
//!     handle.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`router`]: route registration and best-match lookup
//! - [`binder`]: parameter declarations and request-to-argument binding
//! - [`responder`]: handler results to responses
//! - [`shape`]: type descriptors shared by the binder and the OpenAPI generator
//! - [`openapi`] and [`yaml`]: document generation and rendering
//! - [`server`]: the acceptor

pub mod binder;
pub mod openapi;
pub mod responder;
pub mod router;
pub mod server;
pub mod shape;
pub mod yaml;

mod dispatcher;
mod error;
mod fn_trait;
mod handler;
mod request;

pub use dispatcher::Dispatcher;
pub use error::{BindingError, DispatchError, RouteError, ServerBuildError, ServerError};
pub use fn_trait::FnTrait;
pub use handler::{FnHandler, RouteHandler, handler_fn};
pub use request::{PathParams, QueryParams, percent_decode};
pub use responder::{ContentResult, Json, Reply, Responder};
pub use router::{Controller, RouteGroup, Router};
pub use server::{Server, ServerBuilder, ServerConfig, ServerHandle};
pub use shape::{Describe, Shape};
