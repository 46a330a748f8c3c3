//! Response handling module that converts handler results into HTTP responses.
//!
//! This module provides the [`Responder`] trait which defines how different types
//! can be converted into HTTP responses. It includes implementations for common types
//! like Result, Option, String, etc.

use crate::body::ResponseBody;
use bytes::Bytes;
use http::{HeaderValue, Response, StatusCode};
use mime::Mime;
use std::convert::Infallible;

/// A trait for types that can be converted into HTTP responses.
///
/// Types implementing this trait can be returned directly from handler functions
/// and will be automatically converted into HTTP responses.
pub trait Responder {
    fn into_response(self) -> Response<ResponseBody>;
}

/// The Ok and Err variants must both implement Responder.
impl<T: Responder, E: Responder> Responder for Result<T, E> {
    fn into_response(self) -> Response<ResponseBody> {
        match self {
            Ok(t) => t.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

/// None case returns an empty response.
impl<T: Responder> Responder for Option<T> {
    fn into_response(self) -> Response<ResponseBody> {
        match self {
            Some(t) => t.into_response(),
            None => Response::new(ResponseBody::empty()),
        }
    }
}

impl<B> Responder for Response<B>
where
    B: Into<ResponseBody>,
{
    fn into_response(self) -> Response<ResponseBody> {
        self.map(Into::into)
    }
}

impl<T: Responder> Responder for (StatusCode, T) {
    fn into_response(self) -> Response<ResponseBody> {
        let (status, responder) = self;
        let mut response = responder.into_response();
        *response.status_mut() = status;
        response
    }
}

impl<T: Responder> Responder for (T, StatusCode) {
    fn into_response(self) -> Response<ResponseBody> {
        let (responder, status) = self;
        (status, responder).into_response()
    }
}

impl<T: Responder> Responder for Box<T> {
    fn into_response(self) -> Response<ResponseBody> {
        (*self).into_response()
    }
}

impl Responder for () {
    fn into_response(self) -> Response<ResponseBody> {
        Response::new(ResponseBody::empty())
    }
}

impl Responder for &'static str {
    fn into_response(self) -> Response<ResponseBody> {
        with_content_type(Response::new(ResponseBody::from(self)), &mime::TEXT_PLAIN_UTF_8)
    }
}

impl Responder for String {
    fn into_response(self) -> Response<ResponseBody> {
        with_content_type(Response::new(ResponseBody::from(self)), &mime::TEXT_PLAIN_UTF_8)
    }
}

impl Responder for Bytes {
    fn into_response(self) -> Response<ResponseBody> {
        with_content_type(Response::new(ResponseBody::from(self)), &mime::APPLICATION_OCTET_STREAM)
    }
}

impl Responder for Infallible {
    fn into_response(self) -> Response<ResponseBody> {
        match self {}
    }
}

/// An empty response carrying only `status`.
pub fn status_response(status: StatusCode) -> Response<ResponseBody> {
    let mut response = Response::new(ResponseBody::empty());
    *response.status_mut() = status;
    response
}

pub(crate) fn with_content_type(mut response: Response<ResponseBody>, content_type: &Mime) -> Response<ResponseBody> {
    if let Ok(value) = HeaderValue::from_str(content_type.as_ref()) {
        response.headers_mut().insert(http::header::CONTENT_TYPE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_is_plain_text() {
        let response = "hello".into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/plain; charset=utf-8");
    }

    #[test]
    fn test_status_tuple_overrides_status() {
        let response = (StatusCode::CREATED, String::from("created")).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = ("teapot", StatusCode::IM_A_TEAPOT).into_response();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn test_result_uses_both_arms() {
        let ok: Result<&'static str, (StatusCode, &'static str)> = Ok("ok");
        assert_eq!(ok.into_response().status(), StatusCode::OK);

        let err: Result<&'static str, (StatusCode, &'static str)> = Err((StatusCode::BAD_REQUEST, "bad"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
