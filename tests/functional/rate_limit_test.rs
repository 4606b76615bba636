//! Functional tests for rate limiting

use axum::http::StatusCode;
use serde_json::json;
use wiremock::MockServer;

use crate::common::{create_app, get, send, test_settings};

async fn create_limited_app(rps: u32, burst: u32) -> (MockServer, axum::Router) {
    let server = MockServer::start().await;
    let mut settings = test_settings(&server);
    settings.rate_limit.enabled = true;
    settings.rate_limit.requests_per_second = rps;
    settings.rate_limit.burst_size = burst;
    let app = create_app(settings);
    (server, app)
}

#[tokio::test]
async fn test_rate_limit_allows_within_limit() {
    let (_server, app) = create_limited_app(100, 100).await;

    // No action: answered locally, but still counted against the limit
    let (status, _, _) = send(app, get("/")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let (_server, app) = create_limited_app(1, 1).await;

    let (status, _, _) = send(app.clone(), get("/")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, headers, body) = send(app, get("/")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({"message": "Rate limit exceeded"}));
    assert_eq!(headers.get("x-service-version").unwrap(), "3.10.3");
}

#[tokio::test]
async fn test_rate_limit_health_bypass() {
    let (_server, app) = create_limited_app(1, 1).await;

    // Exhaust the quota on the gateway endpoint
    send(app.clone(), get("/")).await;

    for _ in 0..3 {
        let (status, _, _) = send(app.clone(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_rate_limit_disabled() {
    let server = MockServer::start().await;
    let app = create_app(test_settings(&server));

    for _ in 0..5 {
        let (status, _, _) = send(app.clone(), get("/")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
