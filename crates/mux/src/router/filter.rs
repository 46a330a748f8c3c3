//! Route gates.
//!
//! After a route's pattern matched the path, its gates decide whether the route accepts the
//! request:
//! - [`MethodFilter`] compares the request method
//! - [`ContentTypeFilter`] compares the declared `Content-Type`
//!
//! A route without a gate accepts any method or content type. When a structurally matching route
//! rejects the request the router keeps scanning, and answers 405 if no other route accepts it.

use crate::RequestContext;
use http::Method;
use mime::Mime;

/// Core trait for request filtering.
///
/// The `Filter` trait requires `Send + Sync`, ensuring that filters
/// can be safely used in a multi-threaded environment.
pub trait Filter: Send + Sync {
    /// Check if the request matches this filter's criteria.
    fn matches(&self, req: &RequestContext) -> bool;
}

/// A filter that matches HTTP methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodFilter(Method);

impl MethodFilter {
    pub fn new(method: Method) -> Self {
        Self(method)
    }

    pub fn method(&self) -> &Method {
        &self.0
    }
}

impl Filter for MethodFilter {
    fn matches(&self, req: &RequestContext) -> bool {
        self.0.eq(req.method())
    }
}

/// A filter that matches the request `Content-Type`.
///
/// When both the expected and the declared value parse as media types only their essence
/// (`type/subtype`) is compared, so `application/json; charset=utf-8` matches
/// `application/json`. Otherwise the raw strings have to be equal.
#[derive(Debug, Clone)]
pub struct ContentTypeFilter {
    raw: String,
    mime: Option<Mime>,
}

impl ContentTypeFilter {
    pub fn new<S: Into<String>>(content_type: S) -> Self {
        let raw = content_type.into();
        let mime = raw.parse::<Mime>().ok();
        Self { raw, mime }
    }

    pub fn content_type(&self) -> &str {
        &self.raw
    }

    fn accepts(&self, declared: &str) -> bool {
        match (&self.mime, declared.parse::<Mime>()) {
            (Some(expected), Ok(declared)) => expected.essence_str().eq_ignore_ascii_case(declared.essence_str()),
            _ => self.raw == declared,
        }
    }
}

impl Filter for ContentTypeFilter {
    fn matches(&self, req: &RequestContext) -> bool {
        req.content_type().is_some_and(|declared| self.accepts(declared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;

    fn request(method: Method, content_type: Option<&str>) -> RequestContext {
        let mut builder = Request::builder().method(method).uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(http::header::CONTENT_TYPE, content_type);
        }
        builder.body(()).unwrap().into_parts().0.into()
    }

    #[test]
    fn test_method_filter() {
        let filter = MethodFilter::new(Method::POST);

        assert!(filter.matches(&request(Method::POST, None)));
        assert!(!filter.matches(&request(Method::GET, None)));
    }

    #[test]
    fn test_content_type_ignores_parameters() {
        let filter = ContentTypeFilter::new("application/json");

        assert!(filter.matches(&request(Method::POST, Some("application/json"))));
        assert!(filter.matches(&request(Method::POST, Some("application/json; charset=utf-8"))));
        assert!(filter.matches(&request(Method::POST, Some("Application/JSON"))));
        assert!(!filter.matches(&request(Method::POST, Some("text/plain"))));
    }

    #[test]
    fn test_content_type_missing_header() {
        let filter = ContentTypeFilter::new("application/json");
        assert!(!filter.matches(&request(Method::POST, None)));
    }

    #[test]
    fn test_unparsable_content_type_compares_exactly() {
        let filter = ContentTypeFilter::new("not a mime");

        assert!(filter.matches(&request(Method::POST, Some("not a mime"))));
        assert!(!filter.matches(&request(Method::POST, Some("not a MIME"))));
    }
}
