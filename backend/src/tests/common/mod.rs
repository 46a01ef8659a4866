// Common test utilities and helpers

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use cookie::Cookie;
use serde_json::Value;
use tower::ServiceExt;

use crate::{AppState, CookieConfig, LanguageResolver, build_router};

/// Resolver allowing `en` and `fr`, defaulting to `en`
pub fn create_test_resolver() -> LanguageResolver {
    let mut resolver = LanguageResolver::new(CookieConfig::default());
    resolver
        .register_allowed_languages(|| vec!["en".to_string(), "fr".to_string()])
        .register_default_language(|| "en".to_string());
    resolver
}

pub fn create_test_app(resolver: LanguageResolver) -> Router {
    build_router(Arc::new(AppState::new(resolver)))
}

pub fn get_request(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).expect("Failed to build request")
}

pub fn post_json_request(uri: &str, body: Value, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.to_string())).expect("Failed to build request")
}

/// Send a single request through a fresh clone of the router
pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("Router call failed")
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

/// Every `Set-Cookie` header named `name`
pub fn response_cookies(response: &Response<Body>, name: &str) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse_encoded(value.to_string()).ok())
        .filter(|cookie| cookie.name() == name)
        .collect()
}

/// Assert both the `lang` cookie and the JSON body report `language`
pub async fn assert_language_response(response: Response<Body>, language: &str) {
    let cookies = response_cookies(&response, "lang");
    assert_eq!(cookies.len(), 1, "Expected exactly one language cookie");
    assert_eq!(cookies[0].value(), language);

    let data = json_body(response).await;
    assert_eq!(data["language"], language);
}
