//! Route patterns.
//!
//! A pattern is a `/` separated path where each segment is either a literal, a `{name}`
//! variable, or, when the pattern ends with `/`, a wildcard swallowing the rest of the path:
//!
//! | pattern | matches | captures |
//! |---|---|---|
//! | `/users` | `/users` | |
//! | `/users/{id}` | `/users/42` | `id = 42` |
//! | `/static/` | `/static/css/site.css` | `* = css/site.css` |
//! | `/` | `/` | |
//!
//! Request paths are percent-decoded segment by segment before matching, so `/caf%C3%A9`
//! matches the literal `/café` and a `{name}` variable captures the decoded text.

use crate::request::{PathParams, REMAINDER_KEY};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::fmt;

pub(crate) const ROOT: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Variable(String),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parses a pattern, this never fails: tokens that are not `{name}` are literals.
    pub fn parse(pattern: &str) -> Self {
        let mut segments = Vec::new();

        for token in pattern.split('/') {
            if token.is_empty() {
                if segments.is_empty() {
                    continue;
                }
                segments.push(Segment::Wildcard);
                break;
            }

            let segment = match token.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
                Some(name) => Segment::Variable(name.to_string()),
                None => Segment::Literal(token.to_string()),
            };
            segments.push(segment);
        }

        if segments.is_empty() {
            segments.push(Segment::Literal(ROOT.to_string()));
        }

        Self { segments }
    }

    /// A lone wildcard, matching every path.
    pub(crate) fn any() -> Self {
        Self { segments: vec![Segment::Wildcard] }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    /// Matches the pattern against a path split by [`split_path`], returning the captured
    /// parameters on success.
    pub fn matches<S: AsRef<str>>(&self, path: &[S]) -> Option<PathParams> {
        let (segments, wildcard) = match self.segments.split_last() {
            Some((Segment::Wildcard, prefix)) => (prefix, true),
            _ => (self.segments.as_slice(), false),
        };

        if wildcard {
            if path.len() < segments.len() {
                return None;
            }
        } else if path.len() != segments.len() {
            return None;
        }

        let mut params = PathParams::empty();
        for (segment, part) in segments.iter().zip(path) {
            match segment {
                Segment::Literal(literal) => {
                    if literal.as_str() != part.as_ref() {
                        return None;
                    }
                }
                Segment::Variable(name) => params.insert(name.as_str(), part.as_ref()),
                Segment::Wildcard => {}
            }
        }

        if wildcard {
            let rest = path.get(segments.len()..).unwrap_or_default();
            let rest = rest.iter().map(AsRef::as_ref).collect::<Vec<&str>>();
            params.insert(REMAINDER_KEY, rest.join("/"));
        }

        Some(params)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments == [Segment::Literal(ROOT.to_string())] {
            return f.write_str(ROOT);
        }

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => write!(f, "/{literal}")?,
                Segment::Variable(name) => write!(f, "/{{{name}}}")?,
                Segment::Wildcard => f.write_str("/")?,
            }
        }
        Ok(())
    }
}

/// Splits a request path into its non-empty, percent-decoded segments, the root path is the
/// single segment `/`.
///
/// A segment that does not decode to valid UTF-8 is kept as sent.
pub fn split_path(path: &str) -> Vec<Cow<'_, str>> {
    let parts = path.split('/').filter(|part| !part.is_empty()).map(decode_segment).collect::<Vec<_>>();
    if parts.is_empty() { vec![Cow::Borrowed(ROOT)] } else { parts }
}

fn decode_segment(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment).decode_utf8().unwrap_or(Cow::Borrowed(segment))
}
