//! Shared helpers for functional tests

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use cdek_widget_gateway::{
    api::routes::create_router,
    config::{CdekConfig, Settings},
    AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-access-token";

/// Settings pointing at a mock upstream, without rate limiting
pub fn test_settings(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.cdek = CdekConfig::new("test-client", "test-secret")
        .with_base_url(format!("{}/v2", server.uri()));
    settings.rate_limit.enabled = false;
    settings
}

pub fn create_app(settings: Settings) -> Router {
    let state = AppState::from_settings(settings).unwrap();
    create_router(Arc::new(state))
}

/// Mount a token endpoint that expects exactly `times` exchanges
pub async fn mount_token(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/v2/oauth/token"))
        .and(header("x-app-name", "widget_pvz"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=test-client"))
        .and(body_string_contains("client_secret=test-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
