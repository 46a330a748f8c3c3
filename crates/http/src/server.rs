//! Listener binding, the accept loop and graceful shutdown.

use std::fmt::Display;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body::Body;
use tokio::net::TcpListener;
use tokio::select;
use tokio::task::JoinSet;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::ServeError;
use crate::connection::HttpConnection;
use crate::handler::Handler;

/// How long in-flight connections may run after shutdown was requested.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpServer {
    listener: std::net::TcpListener,
    local_addr: SocketAddr,
    tls_acceptor: Option<TlsAcceptor>,
    shutdown_timeout: Duration,
}

impl HttpServer {
    /// Binds the listening socket right away, so an unusable address is reported to the caller
    /// before any serving starts.
    pub fn bind<A: ToSocketAddrs + Display>(address: A) -> Result<Self, ServeError> {
        let listener = std::net::TcpListener::bind(&address).map_err(|e| ServeError::bind(&address, e))?;
        listener.set_nonblocking(true).map_err(|e| ServeError::bind(&address, e))?;
        let local_addr = listener.local_addr().map_err(|e| ServeError::bind(&address, e))?;

        Ok(Self { listener, local_addr, tls_acceptor: None, shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT })
    }

    pub fn tls(mut self, tls_acceptor: TlsAcceptor) -> Self {
        self.tls_acceptor = Some(tls_acceptor);
        self
    }

    pub fn shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_tls(&self) -> bool {
        self.tls_acceptor.is_some()
    }

    /// Runs the accept loop until `shutdown` is cancelled, then drains the open connections.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn serve<H>(self, handler: Arc<H>, shutdown: CancellationToken) -> Result<(), ServeError>
    where
        H: Handler + 'static,
        H::RespBody: Body<Data = Bytes>,
        <H::RespBody as Body>::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let Self { listener, local_addr, tls_acceptor, shutdown_timeout } = self;
        let tcp_listener = TcpListener::from_std(listener)?;

        info!(addr = %local_addr, tls = tls_acceptor.is_some(), "start listening");

        let mut connections = JoinSet::new();
        loop {
            select! {
                () = shutdown.cancelled() => break,

                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        error!(cause = %e, "connection task failed");
                    }
                }

                accepted = tcp_listener.accept() => {
                    let (tcp_stream, remote_addr) = match accepted {
                        Ok(stream_and_addr) => stream_and_addr,
                        Err(e) => {
                            warn!(cause = %e, "failed to accept");
                            continue;
                        }
                    };

                    let handler = Arc::clone(&handler);
                    let shutdown = shutdown.clone();
                    let tls_acceptor = tls_acceptor.clone();

                    connections.spawn(async move {
                        let result = match tls_acceptor {
                            Some(acceptor) => match acceptor.accept(tcp_stream).await {
                                Ok(tls_stream) => {
                                    HttpConnection::new(tls_stream, remote_addr).process(handler, shutdown).await
                                }
                                Err(e) => {
                                    warn!(%remote_addr, cause = %e, "tls handshake failed");
                                    return;
                                }
                            },
                            None => HttpConnection::new(tcp_stream, remote_addr).process(handler, shutdown).await,
                        };

                        match result {
                            Ok(()) => debug!(%remote_addr, "finished process, connection shutdown"),
                            Err(e) => error!(%remote_addr, cause = %e, "service has error, connection shutdown"),
                        }
                    });
                }
            }
        }

        // stop accepting before draining
        drop(tcp_listener);
        drain(&mut connections, shutdown_timeout).await;

        info!(addr = %local_addr, "server stopped");
        Ok(())
    }
}

async fn drain(connections: &mut JoinSet<()>, shutdown_timeout: Duration) {
    if connections.is_empty() {
        return;
    }

    info!(connections = connections.len(), "waiting for in-flight connections");
    let drained = tokio::time::timeout(shutdown_timeout, async {
        while connections.join_next().await.is_some() {}
    })
    .await;

    if drained.is_err() {
        warn!(
            remaining = connections.len(),
            timeout = ?shutdown_timeout,
            "graceful shutdown timed out, closing remaining connections"
        );
        connections.shutdown().await;
    }
}

impl std::fmt::Debug for HttpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServer")
            .field("local_addr", &self.local_addr)
            .field("tls", &self.is_tls())
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish()
    }
}
