use std::any::Any;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;

use crate::binder::{FromArgs, ParamSpec};
use crate::error::DispatchError;
use crate::fn_trait::FnTrait;
use crate::responder::{Reply, Responder, ReturnDoc};

/// A registered route target: takes bound argument values, produces a reply.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn invoke(&self, args: Vec<Value>, params: &[ParamSpec]) -> Result<Reply, DispatchError>;

    /// Number of arguments the handler takes.
    fn arity(&self) -> usize;

    fn return_doc(&self) -> ReturnDoc;
}

/// a `FnTrait` holder which represents any async Fn
pub struct FnHandler<F, Args> {
    f: F,
    _phantom: PhantomData<fn(Args)>,
}

impl<F, Args> FnHandler<F, Args>
where
    F: FnTrait<Args>,
{
    fn new(f: F) -> Self {
        Self { f, _phantom: PhantomData }
    }
}

impl<F, Args> std::fmt::Debug for FnHandler<F, Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").field("f", &std::any::type_name::<F>()).finish()
    }
}

pub fn handler_fn<F, Args>(f: F) -> FnHandler<F, Args>
where
    F: FnTrait<Args>,
{
    FnHandler::new(f)
}

#[async_trait]
impl<F, Args> RouteHandler for FnHandler<F, Args>
where
    F: FnTrait<Args>,
    F::Output: Responder,
    Args: FromArgs,
{
    async fn invoke(&self, args: Vec<Value>, params: &[ParamSpec]) -> Result<Reply, DispatchError> {
        let future = self.f.call(Args::from_args(args, params)?);

        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(output) => output.into_reply(),
            Err(panic) => Err(DispatchError::handler(panic_message(panic.as_ref()))),
        }
    }

    fn arity(&self) -> usize {
        Args::ARITY
    }

    fn return_doc(&self) -> ReturnDoc {
        F::Output::return_doc()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::responder::Json;
    use serde_json::json;

    fn assert_is_handler<T: RouteHandler>(_handler: &T) {
        // no op
    }

    async fn add(a: i32, b: i32) -> Json<i32> {
        Json(a + b)
    }

    async fn fail(message: String) -> Result<String, String> {
        Err(message)
    }

    async fn explode() -> String {
        panic!("boom")
    }

    async fn nothing() {}

    fn params() -> Vec<ParamSpec> {
        vec![ParamSpec::path::<i32>("a"), ParamSpec::path::<i32>("b")]
    }

    #[test]
    fn assert_fn_is_route_handler() {
        assert_is_handler(&handler_fn(add));
        assert_is_handler(&handler_fn(fail));
        assert_is_handler(&handler_fn(nothing));
    }

    #[test]
    fn arity_and_docs() {
        assert_eq!(handler_fn(add).arity(), 2);
        assert_eq!(handler_fn(nothing).arity(), 0);
        assert!(matches!(handler_fn(nothing).return_doc(), ReturnDoc::NoContent));
        assert!(matches!(handler_fn(add).return_doc(), ReturnDoc::Body(_)));
    }

    #[tokio::test]
    async fn invoke_with_bound_values() {
        let reply = handler_fn(add).invoke(vec![json!(12), json!(30)], &params()).await.unwrap();
        assert_eq!(reply, Reply::Json("42".into()));
    }

    #[tokio::test]
    async fn invoke_with_mismatching_value() {
        let error = handler_fn(add).invoke(vec![json!("x"), json!(30)], &params()).await.unwrap_err();
        assert!(matches!(error, DispatchError::Binding { .. }));
    }

    #[tokio::test]
    async fn error_result_is_reported() {
        let error = handler_fn(fail).invoke(vec![json!("nope")], &[ParamSpec::query::<String>("message")]).await.unwrap_err();
        assert_eq!(error.to_string(), "handler error: nope");
    }

    #[tokio::test]
    async fn panic_is_caught() {
        let error = handler_fn(explode).invoke(Vec::new(), &[]).await.unwrap_err();
        assert!(matches!(error, DispatchError::Handler { ref message } if message == "boom"));
    }
}
