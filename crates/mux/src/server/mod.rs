//! The [`Multiplexer`]: route registration plus the start/stop lifecycle of the listening server.
//!
//! `start` freezes the registered routes into a [`Router`](crate::router::Router), wraps it with
//! the middleware chain and serves it from a background thread owning a tokio runtime. The
//! calling thread is never blocked by serving; it decides when to `wait`, `stop` or `restart`.
//!
//! # Example
//!
//! ```no_run
//! use simplemux::handler::handler_fn;
//! use simplemux::{Multiplexer, MuxConfig, ReqBody, RequestContext};
//!
//! async fn hello(_req: RequestContext, _body: ReqBody) -> &'static str {
//!     "hello world"
//! }
//!
//! let mut mux = Multiplexer::new();
//! mux.get("/", handler_fn(hello)).unwrap();
//!
//! let addr = mux.start(&MuxConfig::new("127.0.0.1:8080")).unwrap();
//! println!("listening on {addr}");
//! mux.wait();
//! ```

mod lifecycle;
mod service;

pub use lifecycle::ServerState;

use crate::config::MuxConfig;
use crate::decorator::{Decorator, Middlewares};
use crate::error::{RouteError, ServerError};
use crate::handler::{BoxHandler, RequestHandler};
use crate::router::RouteTable;
use lifecycle::Lifecycle;
use service::MuxService;
use simplemux_http::server::HttpServer;
use simplemux_http::tls::load_tls_acceptor;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const SERVER_THREAD_NAME: &str = "simplemux-server";
const WORKER_THREAD_NAME: &str = "simplemux-worker";

/// Connection tasks are already drained or aborted when the runtime shuts down, this only
/// bounds stray blocking tasks such as file reads. It is further capped by what is left of the
/// shutdown timeout.
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Owns the routes, the middleware chain and at most one running server.
///
/// Dropping a running `Multiplexer` stops it.
pub struct Multiplexer {
    routes: RouteTable,
    middlewares: Middlewares,
    lifecycle: Arc<Lifecycle>,
    running: Option<RunningServer>,
}

struct RunningServer {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    thread: JoinHandle<()>,
}

macro_rules! method_route {
    ($name:ident) => {
        #[doc = concat!("See [`RouteTable::", stringify!($name), "`].")]
        pub fn $name<H: RequestHandler + 'static>(&mut self, pattern: &str, handler: H) -> Result<(), RouteError> {
            self.routes.$name(pattern, handler)
        }
    };
}

impl Multiplexer {
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(),
            middlewares: Middlewares::new(),
            lifecycle: Arc::new(Lifecycle::new()),
            running: None,
        }
    }

    /// See [`RouteTable::add_route`].
    pub fn add_route<H: RequestHandler + 'static>(&mut self, method_route: &str, handler: H) -> Result<(), RouteError> {
        self.routes.add_route(method_route, handler)
    }

    /// See [`RouteTable::add_route_with_content_type`].
    pub fn add_route_with_content_type<H: RequestHandler + 'static>(
        &mut self,
        method_route: &str,
        content_type: &str,
        handler: H,
    ) -> Result<(), RouteError> {
        self.routes.add_route_with_content_type(method_route, content_type, handler)
    }

    method_route!(get);
    method_route!(post);
    method_route!(put);
    method_route!(delete);

    /// See [`RouteTable::not_found`].
    pub fn not_found<H: RequestHandler + 'static>(&mut self, handler: H) -> Result<(), RouteError> {
        self.routes.not_found(handler)
    }

    /// See [`RouteTable::serve_static`].
    pub fn serve_static<P: Into<PathBuf>>(&mut self, path_prefix: &str, directory: P) {
        self.routes.serve_static(path_prefix, directory);
    }

    /// See [`RouteTable::redirect`].
    pub fn redirect(&mut self, method_route: &str, location: &str) -> Result<(), RouteError> {
        self.routes.redirect(method_route, location)
    }

    /// Appends a middleware, the first one registered is the outermost.
    ///
    /// Middleware wraps the whole router, so it also sees 404 and 405 answers.
    pub fn use_middleware<D>(&mut self, middleware: D)
    where
        D: Decorator<BoxHandler> + Send + Sync + 'static,
        D::Out: RequestHandler + 'static,
    {
        self.middlewares.push(middleware);
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn middlewares(&self) -> &Middlewares {
        &self.middlewares
    }

    pub fn state(&self) -> ServerState {
        self.lifecycle.get()
    }

    pub fn is_running(&self) -> bool {
        self.state() == ServerState::Running
    }

    /// The address the running server listens on.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().filter(|_| self.state().is_active()).map(|running| running.local_addr)
    }

    /// Binds `config.bind_addr()` and starts serving from a background thread.
    ///
    /// Routes and middleware registered afterwards are picked up by the next start.
    pub fn start(&mut self, config: &MuxConfig) -> Result<SocketAddr, ServerError> {
        if self.state().is_active() {
            return Err(ServerError::AlreadyRunning);
        }
        // a server stopped through a shutdown handle leaves its thread to join
        self.reap();

        let tls_acceptor = match (config.cert(), config.key()) {
            (Some(cert), Some(key)) if config.tls_enabled() => Some(load_tls_acceptor(cert, key)?),
            _ if config.tls_configured() => {
                warn!(cert = ?config.cert(), key = ?config.key(), "tls files not found, serving plain http");
                None
            }
            _ => None,
        };

        let mut server = HttpServer::bind(&*config.bind_addr())?.shutdown_timeout(config.shutdown_timeout());
        if let Some(tls_acceptor) = tls_acceptor {
            server = server.tls(tls_acceptor);
        }
        let local_addr = server.local_addr();

        let router: BoxHandler = Arc::new(self.routes.snapshot());
        let service = Arc::new(MuxService::new(self.middlewares.decorate(router)));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name(WORKER_THREAD_NAME)
            .build()
            .map_err(ServerError::Runtime)?;

        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let shutdown_timeout = config.shutdown_timeout();
        let lifecycle = Arc::clone(&self.lifecycle);
        let previous = self.lifecycle.get();
        self.lifecycle.set(ServerState::Running);

        let spawned = thread::Builder::new().name(SERVER_THREAD_NAME.to_string()).spawn(move || {
            let _stopped = StoppedOnExit(lifecycle);
            let stop_requested = runtime.spawn({
                let token = token.clone();
                async move {
                    token.cancelled().await;
                    Instant::now()
                }
            });

            if let Err(e) = runtime.block_on(server.serve(service, token.clone())) {
                error!(cause = %e, "server exited with error");
            }

            let grace = if token.is_cancelled() {
                match runtime.block_on(stop_requested) {
                    Ok(requested_at) => runtime_grace(requested_at.elapsed(), shutdown_timeout),
                    Err(_) => Duration::ZERO,
                }
            } else {
                RUNTIME_SHUTDOWN_TIMEOUT
            };
            runtime.shutdown_timeout(grace);
        });

        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                self.lifecycle.set(previous);
                return Err(ServerError::Spawn(e));
            }
        };

        info!(addr = %local_addr, tls = config.tls_enabled(), routes = self.routes.len(), "server started");
        self.running = Some(RunningServer { local_addr, shutdown, thread });
        Ok(local_addr)
    }

    /// Stops accepting, lets in-flight requests finish within the shutdown timeout and blocks
    /// until the server thread exited.
    ///
    /// Requests still running when the timeout elapses are dropped, so `stop` returns within
    /// roughly the shutdown timeout.
    pub fn stop(&mut self) -> Result<(), ServerError> {
        if !self.state().is_active() {
            self.reap();
            return Err(ServerError::NotRunning);
        }
        let Some(running) = self.running.take() else {
            return Err(ServerError::NotRunning);
        };

        info!(addr = %running.local_addr, "stopping server");
        self.lifecycle.begin_stop();
        running.shutdown.cancel();
        join(running.thread);
        self.lifecycle.set(ServerState::Stopped);
        Ok(())
    }

    /// Stops the running server, if any, and starts it again with `config`.
    pub fn restart(&mut self, config: &MuxConfig) -> Result<SocketAddr, ServerError> {
        if let Err(e) = self.stop() {
            debug!(cause = %e, "nothing to stop before restart");
        }
        self.start(config)
    }

    /// Blocks until the server stopped serving, returns immediately when it isn't running.
    pub fn wait(&self) {
        self.lifecycle.wait_inactive();
    }

    /// A handle another thread can use to stop the server while the owner is blocked in
    /// [`wait`](Self::wait). `None` when no server is running.
    pub fn shutdown_handle(&self) -> Option<ShutdownHandle> {
        self.running
            .as_ref()
            .filter(|_| self.state().is_active())
            .map(|running| ShutdownHandle { shutdown: running.shutdown.clone(), lifecycle: Arc::clone(&self.lifecycle) })
    }

    fn reap(&mut self) {
        if let Some(running) = self.running.take() {
            join(running.thread);
        }
    }
}

impl Default for Multiplexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Multiplexer {
    fn drop(&mut self) {
        if self.running.is_some() && self.stop().is_err() {
            debug!("server already stopped on drop");
        }
    }
}

impl std::fmt::Debug for Multiplexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multiplexer")
            .field("routes", &self.routes)
            .field("middlewares", &self.middlewares)
            .field("state", &self.state())
            .field("local_addr", &self.local_addr())
            .finish()
    }
}

/// Triggers the graceful shutdown of a running server from any thread.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    shutdown: CancellationToken,
    lifecycle: Arc<Lifecycle>,
}

impl ShutdownHandle {
    /// Requests the shutdown and returns right away, the owner's `wait` returns once the server
    /// thread exited.
    pub fn shutdown(&self) {
        self.lifecycle.begin_stop();
        self.shutdown.cancel();
    }
}

/// Marks the server stopped however the serving thread exits.
struct StoppedOnExit(Arc<Lifecycle>);

impl Drop for StoppedOnExit {
    fn drop(&mut self) {
        self.0.set(ServerState::Stopped);
    }
}

/// How long the runtime may wait for blocking tasks once connections are gone.
fn runtime_grace(stopping_for: Duration, shutdown_timeout: Duration) -> Duration {
    shutdown_timeout.saturating_sub(stopping_for).min(RUNTIME_SHUTDOWN_TIMEOUT)
}

fn join(thread: JoinHandle<()>) {
    if thread.join().is_err() {
        error!("server thread panicked");
    }
}
