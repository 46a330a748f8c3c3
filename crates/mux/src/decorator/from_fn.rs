use crate::body::{ReqBody, ResponseBody};
use crate::decorator::Decorator;
use crate::handler::{BoxHandler, RequestHandler};
use crate::request::RequestContext;
use crate::responder::Responder;
use async_trait::async_trait;
use http::Response;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// The rest of the chain, handed to a [`from_fn`] middleware.
pub struct Next {
    inner: BoxHandler,
}

impl Next {
    /// Runs the wrapped handler, the middleware may skip it and answer on its own.
    pub async fn run(self, req: RequestContext, req_body: ReqBody) -> Response<ResponseBody> {
        self.inner.invoke(req, req_body).await
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// A middleware made of an async fn, see [`from_fn`].
#[derive(Debug)]
pub struct FromFn<F> {
    f: Arc<F>,
}

/// Builds a middleware from an async fn receiving the request and the rest of the chain.
///
/// ```
/// use simplemux::decorator::{Next, from_fn};
/// use simplemux::{ReqBody, RequestContext};
///
/// let auth = from_fn(|req: RequestContext, body: ReqBody, next: Next| async move {
///     if req.headers().contains_key(http::header::AUTHORIZATION) {
///         next.run(req, body).await
///     } else {
///         simplemux::status_response(http::StatusCode::UNAUTHORIZED)
///     }
/// });
/// ```
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(RequestContext, ReqBody, Next) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: Responder,
{
    FromFn { f: Arc::new(f) }
}

impl<F, Fut> Decorator<BoxHandler> for FromFn<F>
where
    F: Fn(RequestContext, ReqBody, Next) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: Responder,
{
    type Out = FromFnHandler<F>;

    fn decorate(&self, raw: BoxHandler) -> Self::Out {
        FromFnHandler { f: Arc::clone(&self.f), inner: raw }
    }
}

/// The handler a [`FromFn`] middleware wraps around the inner handler.
pub struct FromFnHandler<F> {
    f: Arc<F>,
    inner: BoxHandler,
}

#[async_trait]
impl<F, Fut> RequestHandler for FromFnHandler<F>
where
    F: Fn(RequestContext, ReqBody, Next) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: Responder,
{
    async fn invoke(&self, req: RequestContext, req_body: ReqBody) -> Response<ResponseBody> {
        let next = Next { inner: Arc::clone(&self.inner) };
        (self.f)(req, req_body, next).await.into_response()
    }
}

impl<F> fmt::Debug for FromFnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFnHandler").finish_non_exhaustive()
    }
}
