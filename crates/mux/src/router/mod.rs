//! Route registration and request dispatch.
//!
//! Routes are registered into a [`RouteTable`] in priority order. When the server starts the
//! table is frozen into a [`Router`], an immutable snapshot that resolves every request:
//!
//! 1. routes are tried in registration order, a route matches when its [`Pattern`] matches the
//!    path and its gates accept the method and content type
//! 2. if some pattern matched but every gate rejected the request, the answer is
//!    `405 Method Not Allowed`
//! 3. otherwise the not found handler runs if one was registered, else `404 Not Found`
//!
//! # Example
//!
//! ```
//! use simplemux::handler::handler_fn;
//! use simplemux::router::{RouteResult, RouteTable};
//! use simplemux::{ReqBody, RequestContext};
//!
//! async fn user(req: RequestContext, _body: ReqBody) -> String {
//!     format!("user {}", req.path_params().get("id").unwrap_or_default())
//! }
//!
//! let mut routes = RouteTable::new();
//! routes.add_route("GET /users/{id}", handler_fn(user)).unwrap();
//!
//! let router = routes.snapshot();
//! let (parts, ()) = http::Request::get("/users/42").body(()).unwrap().into_parts();
//!
//! match router.resolve(&RequestContext::new(parts)) {
//!     RouteResult::Matched { params, .. } => assert_eq!(params.get("id"), Some("42")),
//!     _ => unreachable!(),
//! }
//! ```

pub mod filter;
pub mod pattern;

use crate::body::{ReqBody, ResponseBody};
use crate::error::RouteError;
use crate::handler::{BoxHandler, Redirect, RequestHandler, StaticFiles};
use crate::request::{PathParams, RequestContext};
use crate::responder::{status_response, with_content_type};
use async_trait::async_trait;
use filter::{ContentTypeFilter, Filter, MethodFilter};
use http::{HeaderValue, Method, Response, StatusCode, header};
use pattern::{Pattern, split_path};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, trace};

const NOT_FOUND_BODY: &str = "404 page not found\n";

/// A pattern, its gates and the handler answering matching requests.
pub struct Route {
    pattern: Pattern,
    method: Option<MethodFilter>,
    content_type: Option<ContentTypeFilter>,
    handler: BoxHandler,
}

impl Route {
    /// A route accepting any method and content type.
    pub fn new<H: RequestHandler + 'static>(pattern: Pattern, handler: H) -> Self {
        Self { pattern, method: None, content_type: None, handler: Arc::new(handler) }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(MethodFilter::new(method));
        self
    }

    /// An empty content type accepts any.
    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        let content_type = content_type.into();
        self.content_type = (!content_type.is_empty()).then(|| ContentTypeFilter::new(content_type));
        self
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref().map(MethodFilter::method)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_ref().map(ContentTypeFilter::content_type)
    }

    pub fn handler(&self) -> &BoxHandler {
        &self.handler
    }

    fn accepts(&self, req: &RequestContext) -> bool {
        self.method.as_ref().is_none_or(|filter| filter.matches(req))
            && self.content_type.as_ref().is_none_or(|filter| filter.matches(req))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.to_string())
            .field("method", &self.method())
            .field("content_type", &self.content_type())
            .finish_non_exhaustive()
    }
}

/// The registered routes, in priority order, and the optional not found handler.
#[derive(Default, Clone)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
    not_found: Option<BoxHandler>,
}

macro_rules! method_route {
    ($name:ident, $method:literal) => {
        #[doc = concat!("Registers `handler` for `", $method, "` requests matching `pattern`.")]
        pub fn $name<H: RequestHandler + 'static>(&mut self, pattern: &str, handler: H) -> Result<(), RouteError> {
            self.add_route(&format!(concat!($method, " {}"), pattern), handler)
        }
    };
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method_route`, which is either `"METHOD /pattern"` or just
    /// `"/pattern"` to accept any method.
    pub fn add_route<H: RequestHandler + 'static>(&mut self, method_route: &str, handler: H) -> Result<(), RouteError> {
        self.add_route_with_content_type(method_route, "", handler)
    }

    /// Like [`add_route`](Self::add_route), additionally requiring the request `Content-Type`
    /// to match. An empty `content_type` accepts any.
    pub fn add_route_with_content_type<H: RequestHandler + 'static>(
        &mut self,
        method_route: &str,
        content_type: &str,
        handler: H,
    ) -> Result<(), RouteError> {
        let (method, pattern) = parse_method_route(method_route).inspect_err(|e| {
            error!(route = method_route, cause = %e, "discard route");
        })?;

        let mut route = Route::new(pattern, handler).with_content_type(content_type);
        if let Some(method) = method {
            route = route.with_method(method);
        }
        self.push(route);
        Ok(())
    }

    method_route!(get, "GET");
    method_route!(post, "POST");
    method_route!(put, "PUT");
    method_route!(delete, "DELETE");

    /// Appends an already built route.
    pub fn push(&mut self, route: Route) {
        debug!(
            pattern = %route.pattern,
            method = ?route.method(),
            content_type = ?route.content_type(),
            "route registered"
        );
        self.routes.push(Arc::new(route));
    }

    /// Sets the handler answering requests no route matched, only the first call takes effect.
    pub fn not_found<H: RequestHandler + 'static>(&mut self, handler: H) -> Result<(), RouteError> {
        if self.not_found.is_some() {
            error!("not found route already exists");
            return Err(RouteError::NotFoundAlreadyRegistered);
        }
        self.not_found = Some(Arc::new(handler));
        Ok(())
    }

    /// Serves the files below `directory` for `GET` requests under `path_prefix`.
    ///
    /// `serve_static("/assets", "public")` answers `/assets/css/site.css` with
    /// `public/css/site.css`.
    pub fn serve_static<P: Into<PathBuf>>(&mut self, path_prefix: &str, directory: P) {
        let mut pattern = Pattern::parse(&format!("{}/", path_prefix.trim_end_matches('/')));
        if !pattern.has_wildcard() {
            pattern = Pattern::any();
        }
        self.push(Route::new(pattern, StaticFiles::new(directory)).with_method(Method::GET));
    }

    /// Answers requests matching `method_route` with `302 Found` and `Location: location`.
    pub fn redirect(&mut self, method_route: &str, location: &str) -> Result<(), RouteError> {
        let redirect = Redirect::found(location).inspect_err(|e| {
            error!(route = method_route, cause = %e, "discard redirect");
        })?;
        self.add_route(method_route, redirect)
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn has_not_found(&self) -> bool {
        self.not_found.is_some()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freezes the current routes into a [`Router`], later registrations don't affect it.
    pub fn snapshot(&self) -> Router {
        Router { routes: self.routes.clone(), not_found: self.not_found.clone() }
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes)
            .field("not_found", &self.not_found.is_some())
            .finish()
    }
}

/// Splits `"METHOD /pattern"`, a first token containing `/` is the pattern of an any method route.
fn parse_method_route(method_route: &str) -> Result<(Option<Method>, Pattern), RouteError> {
    let (first, rest) = match method_route.split_once(' ') {
        Some((first, rest)) => (first, Some(rest)),
        None => (method_route, None),
    };

    if first.contains('/') {
        return Ok((None, Pattern::parse(first)));
    }

    let Some(pattern) = rest else {
        return Err(RouteError::invalid_method_route(method_route));
    };

    if first.is_empty() {
        return Ok((None, Pattern::parse(pattern)));
    }

    let method = Method::from_bytes(first.as_bytes()).map_err(|e| {
        trace!(cause = %e, "invalid method token");
        RouteError::invalid_method(method_route, first)
    })?;
    Ok((Some(method), Pattern::parse(pattern)))
}

/// How a request was resolved.
pub enum RouteResult<'router> {
    Matched { handler: &'router BoxHandler, params: PathParams },
    /// No route matched and a not found handler is registered.
    Fallback(&'router BoxHandler),
    /// A pattern matched but no route accepted the method or content type.
    MethodNotAllowed,
    NotFound,
}

impl RouteResult<'_> {
    /// The status the router answers with when no handler runs.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RouteResult::Matched { .. } | RouteResult::Fallback(_) => None,
            RouteResult::MethodNotAllowed => Some(StatusCode::METHOD_NOT_ALLOWED),
            RouteResult::NotFound => Some(StatusCode::NOT_FOUND),
        }
    }
}

impl fmt::Debug for RouteResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteResult::Matched { params, .. } => f.debug_struct("Matched").field("params", params).finish_non_exhaustive(),
            RouteResult::Fallback(_) => f.write_str("Fallback"),
            RouteResult::MethodNotAllowed => f.write_str("MethodNotAllowed"),
            RouteResult::NotFound => f.write_str("NotFound"),
        }
    }
}

/// An immutable snapshot of a [`RouteTable`], shared by every connection.
#[derive(Clone)]
pub struct Router {
    routes: Vec<Arc<Route>>,
    not_found: Option<BoxHandler>,
}

impl Router {
    pub fn resolve(&self, req: &RequestContext) -> RouteResult<'_> {
        let path = split_path(req.path());
        let mut structural_match = false;

        for route in &self.routes {
            let Some(params) = route.pattern.matches(&path) else {
                continue;
            };

            structural_match = true;
            if route.accepts(req) {
                return RouteResult::Matched { handler: &route.handler, params };
            }
            trace!(pattern = %route.pattern, method = %req.method(), "route gate rejected request");
        }

        if structural_match {
            RouteResult::MethodNotAllowed
        } else if let Some(handler) = &self.not_found {
            RouteResult::Fallback(handler)
        } else {
            RouteResult::NotFound
        }
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("routes", &self.routes).field("not_found", &self.not_found.is_some()).finish()
    }
}

#[async_trait]
impl RequestHandler for Router {
    async fn invoke(&self, mut req: RequestContext, req_body: ReqBody) -> Response<ResponseBody> {
        match self.resolve(&req) {
            RouteResult::Matched { handler, params } => {
                req.set_path_params(params);
                handler.invoke(req, req_body).await
            }
            RouteResult::Fallback(handler) => handler.invoke(req, req_body).await,
            RouteResult::MethodNotAllowed => status_response(StatusCode::METHOD_NOT_ALLOWED),
            RouteResult::NotFound => not_found(),
        }
    }
}

fn not_found() -> Response<ResponseBody> {
    let mut response = with_content_type(Response::new(ResponseBody::from(NOT_FOUND_BODY)), &mime::TEXT_PLAIN_UTF_8);
    *response.status_mut() = StatusCode::NOT_FOUND;
    response.headers_mut().insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}
