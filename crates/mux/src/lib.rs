//! An embeddable HTTP request router.
//!
//! `simplemux` matches requests against routes registered in priority order, runs them through
//! a chain of middleware and serves them from a background thread that can be started, stopped
//! and restarted by the embedding program.
//!
//! - patterns are `/` separated paths with `{name}` variables and an optional trailing `/`
//!   wildcard, see [`router::pattern`]
//! - a route may require a method and a content type; a path that matches but is rejected by
//!   every route answers `405`, an unmatched path answers `404` or runs the not found handler
//! - middleware is applied in registration order, the first one registered is the outermost
//! - [`Multiplexer::stop`] drains in-flight requests for up to the shutdown timeout
//!
//! # Example
//!
//! ```no_run
//! use simplemux::decorator::AccessLog;
//! use simplemux::handler::handler_fn;
//! use simplemux::{Multiplexer, MuxConfig, ReqBody, RequestContext};
//!
//! async fn user(req: RequestContext, _body: ReqBody) -> String {
//!     format!("user {}", req.path_params().get("id").unwrap_or_default())
//! }
//!
//! let mut mux = Multiplexer::new();
//! mux.use_middleware(AccessLog);
//! mux.get("/users/{id}", handler_fn(user)).unwrap();
//! mux.serve_static("/assets", "public");
//! mux.redirect("GET /home", "/").unwrap();
//!
//! mux.start(&MuxConfig::new("127.0.0.1:8080")).unwrap();
//! mux.wait();
//! ```

mod body;
mod config;
mod error;
mod request;
mod responder;

pub mod decorator;
pub mod handler;
pub mod router;
pub mod server;

pub use body::BoxError;
pub use body::ReqBody;
pub use body::ResponseBody;
pub use config::MuxConfig;
pub use error::RouteError;
pub use error::ServerError;
pub use request::PathParams;
pub use request::QueryParams;
pub use request::RequestContext;
pub use responder::Responder;
pub use responder::status_response;
pub use server::Multiplexer;
pub use server::ServerState;
pub use server::ShutdownHandle;
