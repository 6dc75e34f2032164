// ABOUTME: In-process HTTP client for exercising the interval server router
// ABOUTME: Builds requests with session cookies, bearer secrets or JSON bodies and buffers the response
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode},
    Router,
};
use serde::{de::DeserializeOwned, Serialize};
use tower::ServiceExt;

/// Upper bound on buffered response bodies
const MAX_TEST_BODY_BYTES: usize = 1024 * 1024;

/// Request under construction, sent with `oneshot` against a router
pub struct AxumTestRequest {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Body,
}

impl AxumTestRequest {
    fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_owned(),
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }

    /// `GET uri`
    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    /// `POST uri`
    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Append an arbitrary header
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = HeaderName::try_from(name).expect("valid header name");
        let value = HeaderValue::from_str(value).expect("valid header value");
        self.headers.append(name, value);
        self
    }

    /// Send a `Cookie` header, e.g. the session produced by `TestServer::session_cookie`
    pub fn cookie(self, cookie: &str) -> Self {
        self.header(header::COOKIE.as_str(), cookie)
    }

    /// `Authorization: Bearer {token}`
    pub fn bearer(self, token: &str) -> Self {
        self.header(header::AUTHORIZATION.as_str(), &format!("Bearer {token}"))
    }

    /// JSON request body
    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        let bytes = serde_json::to_vec(data).expect("serializable request body");
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Body::from(bytes);
        self
    }

    /// Dispatch through the router and buffer the whole response
    pub async fn send(self, app: Router) -> AxumTestResponse {
        let mut request = Request::builder()
            .method(self.method)
            .uri(self.uri)
            .body(self.body)
            .expect("valid request");
        *request.headers_mut() = self.headers;

        let response = app.oneshot(request).await.expect("router is infallible");
        AxumTestResponse::buffer(response).await
    }
}

/// Buffered response
pub struct AxumTestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl AxumTestResponse {
    async fn buffer(response: Response<Body>) -> Self {
        let (parts, body) = response.into_parts();
        let body = to_bytes(body, MAX_TEST_BODY_BYTES)
            .await
            .expect("readable response body")
            .to_vec();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// Status code as a plain number
    pub const fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// First value of header `name`
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(self) -> T {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "response is not JSON ({e}): {}",
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    /// Body as UTF-8 text
    pub fn text(self) -> String {
        String::from_utf8(self.body).expect("UTF-8 response body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap as RequestHeaders, routing::get};

    fn echo_headers() -> Router {
        Router::new().route(
            "/echo",
            get(|headers: RequestHeaders| async move {
                let pick = |name: header::HeaderName| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_owned()
                };
                format!("{}|{}", pick(header::COOKIE), pick(header::AUTHORIZATION))
            }),
        )
    }

    #[tokio::test]
    async fn test_cookie_and_bearer_are_forwarded() {
        let response = AxumTestRequest::get("/echo")
            .cookie("user_id=abc")
            .bearer("s3cret")
            .send(echo_headers())
            .await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.text(), "user_id=abc|Bearer s3cret");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = AxumTestRequest::post("/missing").send(echo_headers()).await;
        assert_eq!(response.status(), 404);
    }
}
