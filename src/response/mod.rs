//! Outgoing response construction
//!
//! Every response the gateway produces is JSON and advertises the service
//! version, whether it relays upstream data or reports an error.

use axum::{
    http::{
        header::{HeaderName, HeaderValue, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::debug;

/// Version reported to widget clients
pub const SERVICE_VERSION: &str = "3.10.3";

pub const SERVICE_VERSION_HEADER: &str = "x-service-version";

/// Build a JSON response carrying the fixed service headers
pub fn json_response(status: StatusCode, body: Value) -> Response {
    let mut response = (status, Json(body)).into_response();
    apply_service_headers(response.headers_mut());
    response
}

/// Set `Content-Type` and `X-Service-Version`, replacing any existing values
pub fn apply_service_headers(headers: &mut HeaderMap) {
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static(SERVICE_VERSION_HEADER),
        HeaderValue::from_static(SERVICE_VERSION),
    );
}

/// Append upstream header lines of the form `name: value`.
///
/// Lines that do not parse into a valid header are skipped. The service
/// version header is never overridden by upstream data.
pub fn append_upstream_headers(headers: &mut HeaderMap, lines: &[String]) {
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            debug!(line = %line, "Skipping malformed upstream header line");
            continue;
        };

        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.trim().as_bytes()),
            HeaderValue::from_str(value.trim()),
        ) else {
            debug!(line = %line, "Skipping invalid upstream header");
            continue;
        };

        if name.as_str() == SERVICE_VERSION_HEADER {
            continue;
        }
        headers.append(name, value);
    }
}
