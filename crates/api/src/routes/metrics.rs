use axum::Json;
use telemetry::{metrics, MetricsSnapshot};

/// GET /metrics - Point-in-time counters as JSON.
pub async fn metrics_handler() -> Json<MetricsSnapshot> {
    Json(metrics().snapshot())
}
