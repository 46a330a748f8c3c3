//! Middleware.
//!
//! A middleware is a [`Decorator`]: it takes the handler it wraps and returns a new handler that
//! runs code around it. Middlewares are kept in a [`Middlewares`] chain in registration order and
//! applied in reverse, so the first registered middleware is the outermost layer:
//!
//! ```text
//! A-pre -> B-pre -> handler -> B-post -> A-post
//! ```
//!
//! There are three ways to write one:
//! - [`from_fn`] with an async fn receiving the request and a [`Next`]
//! - [`decorator_fn`] with a plain fn mapping the inner handler to a new handler
//! - implementing [`Decorator`] for a type, as [`AccessLog`] does

mod access_log;
mod decorator_fn;
mod from_fn;
mod middlewares;

pub use access_log::{AccessLog, AccessLogHandler};
pub use decorator_fn::{DecoratorFn, decorator_fn};
pub use from_fn::{FromFn, FromFnHandler, Next, from_fn};
pub use middlewares::{BoxMiddleware, Middlewares};

pub trait Decorator<In> {
    type Out;

    fn decorate(&self, raw: In) -> Self::Out;
}
