//! Request handling module that provides access to HTTP request information and route parameters.
//!
//! This module contains the per-request types handed to handlers:
//! - `RequestContext`: the request head plus the path parameters captured by the router
//! - `PathParams`: named values captured from `{name}` segments and the trailing wildcard
//! - `QueryParams`: the decoded query string, where a key may repeat

use std::collections::HashMap;

use http::request::Parts;
use http::{Extensions, HeaderMap, Method, Uri, Version};
use tracing::debug;

/// The name a trailing wildcard stores the rest of the path under.
pub(crate) const REMAINDER_KEY: &str = "*";

/// Represents the context of an HTTP request.
///
/// Path parameters are carried in a dedicated field rather than in the request extensions, so
/// they can never collide with values other layers put there.
#[derive(Debug)]
pub struct RequestContext {
    parts: Parts,
    path_params: PathParams,
}

impl RequestContext {
    /// Creates a new RequestContext with the given request head and no path parameters
    pub fn new(parts: Parts) -> Self {
        Self { parts, path_params: PathParams::empty() }
    }

    /// Returns a reference to the underlying request head
    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Returns the path component of the request URI
    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.parts.version
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Returns the declared `Content-Type`, if present and valid UTF-8
    pub fn content_type(&self) -> Option<&str> {
        self.parts.headers.get(http::header::CONTENT_TYPE).and_then(|value| value.to_str().ok())
    }

    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.parts.extensions
    }

    /// Returns the parameters the router captured for the matched route
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Decodes the query string of the request URI
    pub fn query_params(&self) -> QueryParams {
        self.parts.uri.query().map(QueryParams::parse).unwrap_or_default()
    }

    pub(crate) fn set_path_params(&mut self, path_params: PathParams) {
        self.path_params = path_params;
    }
}

impl From<Parts> for RequestContext {
    fn from(parts: Parts) -> Self {
        Self::new(parts)
    }
}

/// Named values captured from the request path.
///
/// For the pattern `/users/{id}` and the path `/users/42`, `get("id")` returns `"42"`. A pattern
/// ending with `/` captures the rest of the path, available through [`PathParams::remainder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self { params: Vec::new() }
    }

    /// Returns true if there are no path parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of path parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Gets the value of a path parameter by its name
    #[inline]
    pub fn get(&self, name: impl AsRef<str>) -> Option<&str> {
        let name = name.as_ref();
        self.params.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// The part of the path swallowed by a trailing wildcard, without a leading `/`
    #[inline]
    pub fn remainder(&self) -> Option<&str> {
        self.get(REMAINDER_KEY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// A later value for the same name replaces the earlier one.
    pub(crate) fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.params.push((name, value)),
        }
    }
}

/// Decoded query parameters, a key maps to every value it was given in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: HashMap<String, Vec<String>>,
}

impl QueryParams {
    fn parse(query: &str) -> Self {
        let pairs = match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
            Ok(pairs) => pairs,
            Err(e) => {
                debug!(query, cause = %e, "can't decode query string");
                return Self::default();
            }
        };

        let mut params: HashMap<String, Vec<String>> = HashMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            params.entry(key).or_default().push(value);
        }
        Self { params }
    }

    /// The first value given for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(|values| values.first()).map(String::as_str)
    }

    /// Every value given for `name`, in the order they appear in the query string
    pub fn get_all(&self, name: &str) -> &[String] {
        self.params.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, Vec<String>> {
        self.params
    }
}
