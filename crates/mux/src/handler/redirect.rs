use crate::body::{ReqBody, ResponseBody};
use crate::error::RouteError;
use crate::handler::RequestHandler;
use crate::request::RequestContext;
use async_trait::async_trait;
use http::{HeaderValue, Response, StatusCode, header};

/// Answers every request with `302 Found` pointing at a fixed location.
#[derive(Debug, Clone)]
pub struct Redirect {
    location: HeaderValue,
}

impl Redirect {
    pub fn found(location: &str) -> Result<Self, RouteError> {
        match HeaderValue::from_str(location) {
            Ok(location) => Ok(Self { location }),
            Err(_) => Err(RouteError::invalid_location(location)),
        }
    }

    pub fn location(&self) -> &HeaderValue {
        &self.location
    }
}

#[async_trait]
impl RequestHandler for Redirect {
    async fn invoke(&self, _req: RequestContext, _req_body: ReqBody) -> Response<ResponseBody> {
        let mut response = Response::new(ResponseBody::empty());
        *response.status_mut() = StatusCode::FOUND;
        response.headers_mut().insert(header::LOCATION, self.location.clone());
        response
    }
}
