//! Per-connection request processing.
//!
//! [`HttpConnection`] drives one HTTP/1.1 connection: it feeds every request to the handler and,
//! once the shutdown token is cancelled, lets the in-flight request finish before closing the
//! connection. Idle keep-alive connections close immediately on shutdown.

mod http_connection;

pub use http_connection::HttpConnection;
