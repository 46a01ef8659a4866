use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router, http::StatusCode, routing::get};
use serde_json::{Value, json};

use crate::middleware::language_middleware;
use crate::tests::common::{
    assert_language_response,
    create_test_app,
    create_test_resolver,
    get_request,
    json_body,
    post_json_request,
    response_cookies,
    send,
};
use crate::{CookieConfig, LanguageResolver, current_language};

#[tokio::test]
async fn test_get_default_language() {
    let app = create_test_app(create_test_resolver());

    let response = send(&app, get_request("/api/language", &[])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_language_response(response, "en").await;
}

#[tokio::test]
async fn test_get_language_from_cookie() {
    let app = create_test_app(create_test_resolver());

    let response = send(
        &app,
        get_request("/api/language", &[("cookie", "lang=fr"), ("accept-language", "en")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_language_response(response, "fr").await;
}

#[tokio::test]
async fn test_empty_cookie_uses_accept_language() {
    let app = create_test_app(create_test_resolver());

    let response = send(
        &app,
        get_request("/api/language", &[("cookie", "lang="), ("accept-language", "fr")]),
    )
    .await;
    let cookies = response_cookies(&response, "lang");
    assert_eq!(cookies[0].value(), "fr");
    assert_language_response(response, "fr").await;
}

#[tokio::test]
async fn test_cookie_outside_allowed_languages_is_kept() {
    let app = create_test_app(create_test_resolver());

    let response = send(&app, get_request("/api/language", &[("cookie", "lang=dk")])).await;
    assert_language_response(response, "dk").await;
}

#[tokio::test]
async fn test_get_language_from_accept_language() {
    let app = create_test_app(create_test_resolver());

    let response = send(
        &app,
        get_request("/api/language", &[("accept-language", "de;q=1.0, fr;q=0.9, en;q=0.8")]),
    )
    .await;
    assert_language_response(response, "fr").await;
}

#[tokio::test]
async fn test_accept_language_without_match_uses_default() {
    let app = create_test_app(create_test_resolver());

    let response = send(&app, get_request("/api/language", &[("accept-language", "de, it")])).await;
    assert_language_response(response, "en").await;
}

#[tokio::test]
async fn test_change_allowed_language() {
    let app = create_test_app(create_test_resolver());

    let response = send(&app, post_json_request("/api/language", json!({"language": "fr"}), &[]))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_language_response(response, "fr").await;
}

#[tokio::test]
async fn test_change_not_allowed_language() {
    let app = create_test_app(create_test_resolver());

    let response = send(&app, post_json_request("/api/language", json!({"language": "dk"}), &[]))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_language_response(response, "en").await;
}

#[tokio::test]
async fn test_change_not_allowed_language_keeps_cookie_language() {
    let app = create_test_app(create_test_resolver());

    let response = send(
        &app,
        post_json_request("/api/language", json!({"language": "dk"}), &[("cookie", "lang=fr")]),
    )
    .await;
    assert_language_response(response, "fr").await;
}

#[tokio::test]
async fn test_change_language_without_language_field() {
    let app = create_test_app(create_test_resolver());

    let response = send(&app, post_json_request("/api/language", json!({}), &[])).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_language_response(response, "en").await;
}

#[tokio::test]
async fn test_change_language_with_malformed_body() {
    let app = create_test_app(create_test_resolver());

    let response = send(&app, post_json_request("/api/language", json!({"language": 42}), &[]))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // the request was still resolved, so the cookie is refreshed
    let cookies = response_cookies(&response, "lang");
    assert_eq!(cookies[0].value(), "en");

    let data = json_body(response).await;
    assert_eq!(data["code"], 4002);
}

#[tokio::test]
async fn test_changed_language_sticks_on_next_request() {
    let app = create_test_app(create_test_resolver());

    let response = send(&app, post_json_request("/api/language", json!({"language": "fr"}), &[]))
        .await;
    let cookie = response_cookies(&response, "lang").remove(0);

    let cookie_header = format!("lang={}", cookie.value());
    let headers = [("cookie", cookie_header.as_str()), ("accept-language", "en")];
    let response = send(&app, get_request("/api/language", &headers)).await;
    assert_language_response(response, "fr").await;
}

#[tokio::test]
async fn test_list_languages() {
    let app = create_test_app(create_test_resolver());

    let response = send(&app, get_request("/api/languages", &[("accept-language", "fr")])).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = json_body(response).await;
    assert_eq!(data["allowed"], json!(["en", "fr"]));
    assert_eq!(data["default"], "en");
    assert_eq!(data["current"], "fr");
}

#[tokio::test]
async fn test_cookie_attributes_follow_config() {
    let mut resolver = LanguageResolver::new(CookieConfig {
        name: "locale".to_string(),
        timeout_secs: 7 * 24 * 60 * 60,
        domain: Some("example.com".to_string()),
        secure: true,
        http_only: true,
    });
    resolver
        .register_allowed_languages(|| vec!["en".to_string()])
        .register_default_language(|| "en".to_string());
    let app = create_test_app(resolver);

    let response = send(&app, get_request("/api/language", &[("cookie", "lang=fr")])).await;
    assert!(response_cookies(&response, "lang").is_empty());

    let cookies = response_cookies(&response, "locale");
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].value(), "en");
    assert_eq!(cookies[0].max_age(), Some(cookie::time::Duration::weeks(1)));
    assert_eq!(cookies[0].domain(), Some("example.com"));
    assert_eq!(cookies[0].secure(), Some(true));
    assert_eq!(cookies[0].http_only(), Some(true));
}

#[tokio::test]
async fn test_missing_providers_return_server_error() {
    let mut resolver = LanguageResolver::default();
    resolver.register_default_language(|| "en".to_string());
    let app = create_test_app(resolver);

    let response = send(&app, get_request("/api/language", &[])).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response_cookies(&response, "lang").is_empty());

    let data = json_body(response).await;
    assert_eq!(data["code"], 5003);
}

#[tokio::test]
async fn test_providers_are_evaluated_per_request() {
    let allowed = Arc::new(Mutex::new(vec!["en".to_string(), "fr".to_string()]));
    let provider = Arc::clone(&allowed);

    let mut resolver = LanguageResolver::default();
    resolver
        .register_allowed_languages(move || provider.lock().unwrap().clone())
        .register_default_language(|| "en".to_string());
    let app = create_test_app(resolver);

    let response = send(&app, get_request("/api/language", &[("accept-language", "fr")])).await;
    assert_language_response(response, "fr").await;

    allowed.lock().unwrap().retain(|language| language != "fr");

    let response = send(&app, get_request("/api/language", &[("accept-language", "fr")])).await;
    assert_language_response(response, "en").await;
}

async fn slow_language() -> Json<Value> {
    let before = current_language().to_string();
    tokio::time::sleep(Duration::from_millis(20)).await;
    Json(json!({ "before": before, "language": current_language() }))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_are_isolated() {
    let app = Router::new().route("/slow", get(slow_language)).layer(
        axum::middleware::from_fn_with_state(
            Arc::new(create_test_resolver()),
            language_middleware,
        ),
    );

    let mut handles = Vec::new();
    for i in 0..16 {
        let app = app.clone();
        let language = if i % 2 == 0 { "en" } else { "fr" };
        handles.push(tokio::spawn(async move {
            let cookie = format!("lang={}", language);
            let response = send(&app, get_request("/slow", &[("cookie", cookie.as_str())])).await;
            let cookies = response_cookies(&response, "lang");
            (language, cookies[0].value().to_string(), json_body(response).await)
        }));
    }

    for handle in handles {
        let (expected, cookie_value, data) = handle.await.unwrap();
        assert_eq!(cookie_value, expected);
        assert_eq!(data["before"], expected);
        assert_eq!(data["language"], expected);
    }
}
