//! Unit tests for response construction

use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::response::IntoResponse;
use cdek_widget_gateway::response::{json_response, SERVICE_VERSION, SERVICE_VERSION_HEADER};
use cdek_widget_gateway::AppError;

#[test]
fn test_validation_error_response() {
    let response = AppError::validation("Action is required").into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
    assert_eq!(
        response.headers().get(SERVICE_VERSION_HEADER).unwrap(),
        SERVICE_VERSION
    );
}

#[test]
fn test_error_status_mapping() {
    assert_eq!(
        AppError::Unauthorized.into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Upstream("timeout".to_string()).into_response().status(),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        AppError::RateLimitExceeded.into_response().status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn test_error_body_is_message_object() {
    let response = AppError::validation("Unknown action").into_response();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body, serde_json::json!({"message": "Unknown action"}));
}

#[test]
fn test_json_response_for_arrays() {
    let response = json_response(StatusCode::OK, serde_json::json!([1, 2, 3]));
    assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
    assert_eq!(
        response.headers().get(SERVICE_VERSION_HEADER).unwrap(),
        SERVICE_VERSION
    );
}
