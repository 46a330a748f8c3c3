//! Request logging.
//!
//! [`AccessLog`] logs one line per request at `INFO` once the wrapped handler answered:
//!
//! ```text
//! INFO simplemux::decorator::access_log: request finished method=GET path=/users/42 status=200 latency=153.2µs
//! ```

use crate::body::{ReqBody, ResponseBody};
use crate::decorator::Decorator;
use crate::handler::RequestHandler;
use crate::request::RequestContext;
use async_trait::async_trait;
use http::Response;
use std::time::Instant;
use tracing::info;

/// A middleware logging method, path, status and latency of every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessLog;

/// The handler [`AccessLog`] wraps around the inner handler.
#[derive(Debug)]
pub struct AccessLogHandler<H> {
    handler: H,
}

impl<H: RequestHandler> Decorator<H> for AccessLog {
    type Out = AccessLogHandler<H>;

    fn decorate(&self, raw: H) -> Self::Out {
        AccessLogHandler { handler: raw }
    }
}

#[async_trait]
impl<H: RequestHandler> RequestHandler for AccessLogHandler<H> {
    async fn invoke(&self, req: RequestContext, req_body: ReqBody) -> Response<ResponseBody> {
        let method = req.method().clone();
        let path = req.path().to_string();
        let start = Instant::now();

        let response = self.handler.invoke(req, req_body).await;

        info!(
            %method,
            path = %path,
            status = response.status().as_u16(),
            latency = ?start.elapsed(),
            "request finished"
        );
        response
    }
}
