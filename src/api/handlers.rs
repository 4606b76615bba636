//! Request handlers

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{field, info, info_span, Instrument};
use uuid::Uuid;

use crate::error::AppError;
use crate::gateway::merge_input;
use crate::response::{json_response, SERVICE_VERSION};
use crate::AppState;

/// Gateway endpoint: merge query and body, then proxy to the CDEK API
pub async fn gateway(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("gateway_request", %request_id, action = field::Empty);

    async move {
        let result = match query {
            Ok(Query(pairs)) => merge_input(pairs, &body),
            Err(rejection) => Err(AppError::validation(format!(
                "Malformed query string: {}",
                rejection.body_text()
            ))),
        };

        let result = match result {
            Ok(input) => state.service.handle(input).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => {
                info!(status = response.status.as_u16(), "Request relayed");
                response.into_response()
            }
            Err(e) => {
                info!(status = e.status_code().as_u16(), error = %e, "Request rejected");
                e.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

/// Liveness probe
pub async fn health() -> Response {
    json_response(
        axum::http::StatusCode::OK,
        serde_json::json!({ "status": "ok", "version": SERVICE_VERSION }),
    )
}
