//! Router construction

use axum::{
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::handlers;
use crate::middleware::RateLimitLayer;
use crate::AppState;

pub const HEALTH_PATH: &str = "/health";

/// Build the application router.
///
/// The gateway is mounted at `/` and `/api/cdek` and accepts any method.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", any(handlers::gateway))
        .route("/api/cdek", any(handlers::gateway))
        .route(HEALTH_PATH, get(handlers::health));

    if state.settings.rate_limit.enabled {
        router = router.layer(RateLimitLayer::from_config(&state.settings.rate_limit));
    }

    router = router.layer(TraceLayer::new_for_http());

    if state.settings.gateway.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}
