//! Health check endpoints.

use axum::{extract::State, http::StatusCode, Json};
use telemetry::{health, metrics};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health - Full health check.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = health().snapshot();

    Json(HealthResponse {
        status: snapshot.status.as_str().to_string(),
        storage_healthy: snapshot.upload_dir_writable,
        storage_error: snapshot.upload_dir_error,
        worker_state: snapshot.worker_state.to_string(),
        publisher_healthy: state.uploads.publisher_healthy(),
        queue_depth: metrics().queue_depth.get(),
        user_count: state.records.count(),
    })
}

/// GET /health/ready - Readiness probe (uploads will be stored and processed).
pub async fn ready_handler() -> StatusCode {
    if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe.
pub async fn live_handler() -> StatusCode {
    StatusCode::OK
}
