//! Typed extraction of bound JSON values into a handler's parameter tuple.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::binder::ParamSpec;
use crate::error::BindingError;

/// A parameter tuple that can be built from the values produced by
/// [`bind_arguments`](crate::binder::bind_arguments).
pub trait FromArgs: Sized {
    /// Number of parameters the tuple takes.
    const ARITY: usize;

    fn from_args(args: Vec<Value>, params: &[ParamSpec]) -> Result<Self, BindingError>;
}

impl FromArgs for () {
    const ARITY: usize = 0;

    fn from_args(_args: Vec<Value>, _params: &[ParamSpec]) -> Result<Self, BindingError> {
        Ok(())
    }
}

fn deserialize_arg<T: DeserializeOwned>(index: usize, value: Option<Value>, params: &[ParamSpec]) -> Result<T, BindingError> {
    let value = value.unwrap_or(Value::Null);
    T::deserialize(&value).map_err(|e| {
        trace!(index, cause = %e, "can't deserialize argument");
        match params.get(index) {
            Some(param) => BindingError::new(param.name(), value.to_string(), param.shape()),
            None => BindingError::new(format!("#{index}"), value.to_string(), "unknown"),
        }
    })
}

/// implements `FromArgs` for tuples of 1 to 12 `DeserializeOwned` types
macro_rules! impl_from_args_for_tuple {
    ($($index:tt $param:ident)+) => {
        impl<$($param,)+> FromArgs for ($($param,)+)
        where
            $($param: DeserializeOwned,)+
        {
            const ARITY: usize = [$(stringify!($param)),+].len();

            fn from_args(args: Vec<Value>, params: &[ParamSpec]) -> Result<Self, BindingError> {
                let mut args = args.into_iter();
                Ok(($(deserialize_arg::<$param>($index, args.next(), params)?,)+))
            }
        }
    };
}

impl_from_args_for_tuple! { 0 A }
impl_from_args_for_tuple! { 0 A 1 B }
impl_from_args_for_tuple! { 0 A 1 B 2 C }
impl_from_args_for_tuple! { 0 A 1 B 2 C 3 D }
impl_from_args_for_tuple! { 0 A 1 B 2 C 3 D 4 E }
impl_from_args_for_tuple! { 0 A 1 B 2 C 3 D 4 E 5 F }
impl_from_args_for_tuple! { 0 A 1 B 2 C 3 D 4 E 5 F 6 G }
impl_from_args_for_tuple! { 0 A 1 B 2 C 3 D 4 E 5 F 6 G 7 H }
impl_from_args_for_tuple! { 0 A 1 B 2 C 3 D 4 E 5 F 6 G 7 H 8 I }
impl_from_args_for_tuple! { 0 A 1 B 2 C 3 D 4 E 5 F 6 G 7 H 8 I 9 J }
impl_from_args_for_tuple! { 0 A 1 B 2 C 3 D 4 E 5 F 6 G 7 H 8 I 9 J 10 K }
impl_from_args_for_tuple! { 0 A 1 B 2 C 3 D 4 E 5 F 6 G 7 H 8 I 9 J 10 K 11 L }
