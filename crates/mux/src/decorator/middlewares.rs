use crate::decorator::Decorator;
use crate::handler::{BoxHandler, RequestHandler};
use std::fmt;
use std::sync::Arc;

/// A type-erased middleware.
pub type BoxMiddleware = Box<dyn Decorator<BoxHandler, Out = BoxHandler> + Send + Sync>;

/// Boxes the handler a middleware returns, so any decorator fits into the chain.
struct Erased<D>(D);

impl<D> Decorator<BoxHandler> for Erased<D>
where
    D: Decorator<BoxHandler>,
    D::Out: RequestHandler + 'static,
{
    type Out = BoxHandler;

    fn decorate(&self, raw: BoxHandler) -> Self::Out {
        Arc::new(self.0.decorate(raw))
    }
}

/// The ordered middleware chain.
#[derive(Default)]
pub struct Middlewares {
    middlewares: Vec<BoxMiddleware>,
}

impl Middlewares {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware, it runs inside every middleware pushed before it.
    pub fn push<D>(&mut self, middleware: D)
    where
        D: Decorator<BoxHandler> + Send + Sync + 'static,
        D::Out: RequestHandler + 'static,
    {
        self.middlewares.push(Box::new(Erased(middleware)));
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl Decorator<BoxHandler> for Middlewares {
    type Out = BoxHandler;

    /// Wraps `raw` with the middlewares in reverse registration order, leaving the first
    /// registered one outermost. An empty chain returns `raw` unchanged.
    fn decorate(&self, raw: BoxHandler) -> Self::Out {
        self.middlewares.iter().rev().fold(raw, |handler, middleware| middleware.decorate(handler))
    }
}

impl fmt::Debug for Middlewares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middlewares").field("len", &self.middlewares.len()).finish()
    }
}
