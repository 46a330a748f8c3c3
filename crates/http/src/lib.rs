//! The transport layer of simplemux.
//!
//! This crate accepts TCP (optionally TLS) connections, hands every request of a connection to a
//! single [`handler::Handler`], and shuts down gracefully: when the shutdown token is cancelled
//! the listener stops accepting, every open connection is asked to finish its in-flight request,
//! and whatever is still running when the shutdown timeout elapses is closed forcibly.
//!
//! Routing, middleware and the start/stop lifecycle live in the `simplemux` crate; this crate
//! knows nothing about them.
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::{Request, Response};
//! use http_body_util::Full;
//! use hyper::body::Incoming;
//! use simplemux_http::handler::make_handler;
//! use simplemux_http::server::HttpServer;
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = HttpServer::bind("127.0.0.1:8080").expect("bind failed");
//!     let handler = Arc::new(make_handler(hello_world));
//!     let shutdown = CancellationToken::new();
//!
//!     server.serve(handler, shutdown).await.expect("serve failed");
//! }
//!
//! async fn hello_world(_request: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
//!     Ok(Response::new(Full::new(Bytes::from_static(b"Hello World!\r\n"))))
//! }
//! ```
//!
//! # Limitations
//!
//! - HTTP/1.1 only
//! - no per-request timeout, the shutdown timeout is the only cancellation mechanism

pub mod connection;
pub mod handler;
pub mod server;
pub mod tls;

mod error;
mod utils;

pub(crate) use utils::ensure;

pub use error::ServeError;
pub use error::TlsError;
