//! Worker shutdown with events still queued.
//!
//! The in-flight event finishes (rows stored, file deleted) before the loop
//! exits; events still waiting in the queue are left alone.

use import_core::UploadEvent;
use integration_tests::{fixtures, mocks::GatedParser, setup::TestContext};
use std::sync::Arc;
use worker::WorkerState;

#[tokio::test]
async fn test_shutdown_finishes_in_flight_event_only() {
    let (parser, mut gate) = GatedParser::new();
    let ctx = TestContext::with_parser(Arc::new(parser)).await;
    ctx.start_worker();

    let mut paths = Vec::new();
    for i in 0..3 {
        let contents = fixtures::users_csv(&format!("file{i}"), 2);
        let path = ctx
            .gateway
            .store(contents.as_bytes(), &format!("file{i}.csv"))
            .await
            .unwrap();
        ctx.queue
            .publish(UploadEvent::new(path.clone(), format!("file{i}.csv")))
            .unwrap();
        paths.push(path);
    }

    // First event is dequeued and parked inside the parser
    assert_eq!(gate.entered().await, paths[0]);

    ctx.scheduler.request_shutdown();
    assert_eq!(ctx.scheduler.state(), WorkerState::Stopping);
    gate.release();

    let handled = ctx.scheduler.shutdown().await;
    assert_eq!(handled, Some(1));
    assert_eq!(ctx.scheduler.state(), WorkerState::Stopped);

    // In-flight event ran to completion
    assert!(!paths[0].exists());
    assert_eq!(ctx.records.count(), 2);
    assert!(ctx.records.find_by_id("file0-1").is_some());

    // The rest were never touched
    assert!(paths[1].exists());
    assert!(paths[2].exists());
    assert_eq!(ctx.queue.len(), 2);
}

#[tokio::test]
async fn test_shutdown_while_idle_is_prompt_and_idempotent() {
    let ctx = TestContext::new().await;
    ctx.start_worker();

    let handled = tokio::time::timeout(std::time::Duration::from_secs(1), ctx.scheduler.shutdown())
        .await
        .expect("idle worker should stop promptly");
    assert_eq!(handled, Some(0));

    assert_eq!(ctx.scheduler.shutdown().await, None);
    assert!(ctx.scheduler.start().is_err());
}

#[tokio::test]
async fn test_closed_queue_rejects_uploads_but_drains_backlog() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    server
        .post("/api/files/upload")
        .multipart(fixtures::upload_form(fixtures::users_csv("early", 2), "early.csv"))
        .await
        .assert_status_ok();

    ctx.queue.close();

    let response = server
        .post("/api/files/upload")
        .multipart(fixtures::upload_form(fixtures::users_csv("late", 2), "late.csv"))
        .await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);

    // Buffered event is still delivered once the worker starts
    ctx.start_worker();
    ctx.wait_for_user_count(2).await;
    assert!(ctx.records.find_by_id("early-0").is_some());
    assert!(ctx.records.find_by_id("late-0").is_none());
}
