//! Request handlers.
//!
//! Everything that answers a request implements [`RequestHandler`]: user handlers built with
//! [`handler_fn`], the [`Router`](crate::router::Router) itself, the built-in [`Redirect`] and
//! [`StaticFiles`] handlers, and every handler a middleware wraps.

mod redirect;
mod static_files;

pub use redirect::Redirect;
pub use static_files::StaticFiles;

use crate::body::{ReqBody, ResponseBody};
use crate::request::RequestContext;
use crate::responder::Responder;
use async_trait::async_trait;
use http::Response;
use std::future::Future;
use std::sync::Arc;

#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, req: RequestContext, req_body: ReqBody) -> Response<ResponseBody>;
}

/// A type-erased handler that routes and middleware share.
pub type BoxHandler = Arc<dyn RequestHandler>;

#[async_trait]
impl<H> RequestHandler for Arc<H>
where
    H: RequestHandler + ?Sized,
{
    async fn invoke(&self, req: RequestContext, req_body: ReqBody) -> Response<ResponseBody> {
        (**self).invoke(req, req_body).await
    }
}

#[async_trait]
impl<H> RequestHandler for Box<H>
where
    H: RequestHandler + ?Sized,
{
    async fn invoke(&self, req: RequestContext, req_body: ReqBody) -> Response<ResponseBody> {
        (**self).invoke(req, req_body).await
    }
}

/// An async fn holder, see [`handler_fn`].
#[derive(Clone, Copy, Debug)]
pub struct FnHandler<F> {
    f: F,
}

/// Turns an async fn taking the request context and body into a [`RequestHandler`].
///
/// Anything the fn returns that implements [`Responder`] becomes the response.
///
/// ```
/// use simplemux::handler::handler_fn;
/// use simplemux::{ReqBody, RequestContext};
///
/// async fn hello(req: RequestContext, _body: ReqBody) -> String {
///     format!("hello {}", req.path_params().get("name").unwrap_or("world"))
/// }
///
/// let handler = handler_fn(hello);
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(RequestContext, ReqBody) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: Responder,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> RequestHandler for FnHandler<F>
where
    F: Fn(RequestContext, ReqBody) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: Responder,
{
    async fn invoke(&self, req: RequestContext, req_body: ReqBody) -> Response<ResponseBody> {
        (self.f)(req, req_body).await.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Request, StatusCode};

    fn assert_is_handler<T: RequestHandler>(_handler: &T) {
        // no op
    }

    async fn hello(_req: RequestContext, _body: ReqBody) -> &'static str {
        "hello"
    }

    #[test]
    fn assert_fn_is_handler() {
        let handler = handler_fn(hello);
        assert_is_handler(&handler);

        let boxed: BoxHandler = Arc::new(handler);
        assert_is_handler(&boxed);
    }

    #[tokio::test]
    async fn test_fn_handler_reads_body() {
        let handler = handler_fn(|req: RequestContext, body: ReqBody| async move {
            let bytes = body.bytes().await.unwrap_or_default();
            (StatusCode::ACCEPTED, format!("{} {}", req.method(), String::from_utf8_lossy(&bytes)))
        });

        let (parts, ()) = Request::post("/echo").body(()).unwrap().into_parts();
        let response = handler.invoke(RequestContext::new(parts), ReqBody::from("ping")).await;

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.into_body().bytes().await.unwrap(), "POST ping");
    }
}
