//! Tests for health check endpoints.
//!
//! The health registry is process-global, so readiness assertions live in
//! this binary where no other test starts a worker.

use axum::http::StatusCode;
use integration_tests::setup::TestContext;
use serde_json::Value;

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    for field in [
        "status",
        "storage_healthy",
        "worker_state",
        "publisher_healthy",
        "queue_depth",
        "user_count",
    ] {
        assert!(body.get(field).is_some(), "Response should have '{}' field", field);
    }
    assert_eq!(body["storage_healthy"], true);
    assert!(body["worker_state"].is_string());
}

/// Readiness tracks the worker: not ready before start or after shutdown.
#[tokio::test]
async fn test_readiness_follows_worker_lifecycle() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    server.get("/health/live").await.assert_status_ok();
    server
        .get("/health/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    ctx.start_worker();
    server.get("/health/ready").await.assert_status_ok();
    let body: Value = server.get("/health").await.json();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["worker_state"], "running");

    ctx.scheduler.shutdown().await;
    let body: Value = server.get("/health").await.json();
    assert_eq!(body["worker_state"], "stopped");
    server
        .get("/health/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    server.get("/health/live").await.assert_status_ok();
}
