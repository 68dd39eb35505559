//! The downstream application seam.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::{Request, Response};

/// An HTTP application: turns one request into one response.
///
/// Handlers may be invoked concurrently from many connections, and more
/// than once for the same logical request when a profile asks for
/// repeated invocations.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: Request) -> Response;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn call(&self, req: Request) -> Response {
        (**self).call(req).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn call(&self, req: Request) -> Response {
        (**self).call(req).await
    }
}

/// Handler backed by an async closure. See [`handler_fn`].
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap an async closure as a [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send,
{
    HandlerFn { f }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send,
{
    async fn call(&self, req: Request) -> Response {
        (self.f)(req).await
    }
}
