use std::io;

use simplemux_http::{ServeError, TlsError};
use thiserror::Error;

/// Why a route registration was rejected.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid method route {route:?}: expected \"METHOD /path\" or \"/path\"")]
    InvalidMethodRoute { route: String },

    #[error("invalid http method {method:?} in route {route:?}")]
    InvalidMethod { route: String, method: String },

    #[error("invalid redirect location {location:?}")]
    InvalidLocation { location: String },

    #[error("a not found handler is already registered")]
    NotFoundAlreadyRegistered,
}

impl RouteError {
    pub(crate) fn invalid_method_route<S: Into<String>>(route: S) -> Self {
        Self::InvalidMethodRoute { route: route.into() }
    }

    pub(crate) fn invalid_method<S: Into<String>, M: Into<String>>(route: S, method: M) -> Self {
        Self::InvalidMethod { route: route.into(), method: method.into() }
    }

    pub(crate) fn invalid_location<S: Into<String>>(location: S) -> Self {
        Self::InvalidLocation { location: location.into() }
    }
}

/// Errors of the start/stop lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server is already running")]
    AlreadyRunning,

    #[error("server is not running")]
    NotRunning,

    #[error("bind error: {source}")]
    Bind {
        #[from]
        source: ServeError,
    },

    #[error("tls error: {source}")]
    Tls {
        #[from]
        source: TlsError,
    },

    #[error("can't build runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("can't spawn server thread: {0}")]
    Spawn(#[source] io::Error),
}
