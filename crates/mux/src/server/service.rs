//! The bridge between the transport and the middleware-wrapped router.

use crate::body::{ReqBody, ResponseBody};
use crate::handler::BoxHandler;
use crate::request::RequestContext;
use async_trait::async_trait;
use http::{Request, Response};
use hyper::body::Incoming;
use simplemux_http::handler::Handler;
use std::convert::Infallible;
use std::fmt;

/// The single entry point handed to the transport.
pub(crate) struct MuxService {
    entry: BoxHandler,
}

impl MuxService {
    pub(crate) fn new(entry: BoxHandler) -> Self {
        Self { entry }
    }
}

#[async_trait]
impl Handler for MuxService {
    type RespBody = ResponseBody;
    type Error = Infallible;

    async fn call(&self, req: Request<Incoming>) -> Result<Response<Self::RespBody>, Self::Error> {
        let (parts, body) = req.into_parts();
        Ok(self.entry.invoke(RequestContext::new(parts), ReqBody::from(body)).await)
    }
}

impl fmt::Debug for MuxService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MuxService").finish_non_exhaustive()
    }
}
