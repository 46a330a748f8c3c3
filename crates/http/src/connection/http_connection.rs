use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::Request;
use http_body::Body;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::handler::Handler;

/// An HTTP connection bound to a single accepted stream
///
/// # Type Parameters
///
/// * `I`: the accepted stream, either a plain `TcpStream` or a tls stream wrapping it
pub struct HttpConnection<I> {
    io: I,
    remote_addr: SocketAddr,
}

impl<I> HttpConnection<I>
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(io: I, remote_addr: SocketAddr) -> Self {
        Self { io, remote_addr }
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Serves requests until the peer closes the connection or `shutdown` is cancelled.
    pub async fn process<H>(self, handler: Arc<H>, shutdown: CancellationToken) -> Result<(), hyper::Error>
    where
        H: Handler + 'static,
        <H::RespBody as Body>::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
        H::RespBody: Body<Data = Bytes>,
    {
        let service = service_fn(move |req: Request<Incoming>| {
            let handler = Arc::clone(&handler);
            async move { handler.call(req).await }
        });

        let connection = http1::Builder::new().serve_connection(TokioIo::new(self.io), service);
        tokio::pin!(connection);

        select! {
            result = connection.as_mut() => result,
            () = shutdown.cancelled() => {
                debug!(remote_addr = %self.remote_addr, "shutdown requested, finishing in-flight request");
                connection.as_mut().graceful_shutdown();
                connection.await
            }
        }
    }
}
