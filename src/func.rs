//! The job function seam.
//!
//! A [`JobFn`] stands in for the real work of a job. It receives the
//! positional arguments passed to `Job::run` and its value becomes the
//! run's success payload. Arguments and results are `serde_json::Value`
//! so one function type covers any arity and return shape.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BoxError;

/// Work performed by a mock job once its delay has elapsed.
#[async_trait]
pub trait JobFn: Send + Sync {
    /// Invoke the function with the arguments given to `run`.
    async fn call(&self, args: Vec<Value>) -> Result<Value, BoxError>;
}

/// Default stub: ignores its arguments and resolves to `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

#[async_trait]
impl JobFn for Noop {
    async fn call(&self, _args: Vec<Value>) -> Result<Value, BoxError> {
        Ok(Value::Null)
    }
}

struct SyncFn<F>(F);

#[async_trait]
impl<F> JobFn for SyncFn<F>
where
    F: Fn(Vec<Value>) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    async fn call(&self, args: Vec<Value>) -> Result<Value, BoxError> {
        (self.0)(args)
    }
}

struct AsyncFn<F>(F);

#[async_trait]
impl<F, Fut> JobFn for AsyncFn<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, BoxError>> + Send,
{
    async fn call(&self, args: Vec<Value>) -> Result<Value, BoxError> {
        (self.0)(args).await
    }
}

/// The default job function.
pub fn noop() -> Arc<dyn JobFn> {
    Arc::new(Noop)
}

/// Wrap a synchronous closure as a job function.
pub fn from_fn<F>(f: F) -> Arc<dyn JobFn>
where
    F: Fn(Vec<Value>) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    Arc::new(SyncFn(f))
}

/// Wrap a closure returning a future as a job function.
pub fn from_async_fn<F, Fut>(f: F) -> Arc<dyn JobFn>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
{
    Arc::new(AsyncFn(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_noop_resolves_null() {
        let value = noop().call(vec![json!(1)]).await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_sync_fn_sees_args() {
        let f = from_fn(|args| Ok(Value::Array(args)));
        let value = f.call(vec![json!(1), json!("a")]).await.unwrap();
        assert_eq!(value, json!([1, "a"]));
    }

    #[tokio::test]
    async fn test_async_fn_error() {
        let f = from_async_fn(|_args| async { Err::<Value, BoxError>("nope".into()) });
        let err = f.call(vec![]).await.unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}
