//! Common test setup functions.

use api::{router, AppState, UploadService};
use axum::Router;
use axum_test::TestServer;
use event_queue::EventQueue;
use import_core::{CsvParser, RowParser};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storage::{RecordStore, StorageConfig, StorageGateway};
use telemetry::health;
use tempfile::TempDir;
use worker::{IngestionWorker, WorkerConfig, WorkerScheduler};

use crate::mocks::MockPublisher;

/// Full pipeline in a temp upload directory.
///
/// Same wiring as the binary: the real router, a real queue and the real
/// worker. The worker is not started until [`TestContext::start_worker`].
pub struct TestContext {
    pub dir: TempDir,
    pub gateway: Arc<StorageGateway>,
    pub records: Arc<RecordStore>,
    pub queue: Arc<EventQueue>,
    pub scheduler: WorkerScheduler,
    pub router: Router,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_parser(Arc::new(CsvParser::new())).await
    }

    /// Pipeline whose worker uses `parser` instead of the CSV parser.
    pub async fn with_parser(parser: Arc<dyn RowParser>) -> Self {
        let (dir, gateway) = temp_gateway().await;
        let records = Arc::new(RecordStore::new());
        let queue = Arc::new(EventQueue::new());

        let ingestion = Arc::new(IngestionWorker::new(
            parser,
            records.clone(),
            gateway.clone(),
        ));
        let scheduler = WorkerScheduler::new(
            WorkerConfig {
                shutdown_timeout_secs: 5,
            },
            ingestion,
            queue.clone(),
        );

        let state = AppState::new(gateway.clone(), queue.clone(), records.clone());
        let router = router(state);

        Self {
            dir,
            gateway,
            records,
            queue,
            scheduler,
            router,
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }

    pub fn start_worker(&self) {
        self.scheduler.start().expect("Failed to start worker");
    }

    /// Upload service publishing to this context's queue, for driving uploads
    /// concurrently without HTTP.
    pub fn upload_service(&self) -> Arc<UploadService> {
        Arc::new(UploadService::new(self.gateway.clone(), self.queue.clone()))
    }

    /// Completed uploads currently in the upload directory.
    pub fn stored_files(&self) -> Vec<PathBuf> {
        stored_files(&self.gateway)
    }

    pub async fn wait_for_user_count(&self, expected: usize) {
        let records = self.records.clone();
        wait_until(move || {
            let records = records.clone();
            async move { records.count() == expected }
        })
        .await;
    }

    pub async fn wait_for_empty_upload_dir(&self) {
        let gateway = self.gateway.clone();
        wait_until(move || {
            let gateway = gateway.clone();
            async move { stored_files(&gateway).is_empty() }
        })
        .await;
    }
}

/// Upload path only: the router publishes into a [`MockPublisher`] and no
/// worker runs.
pub struct MockContext {
    pub dir: TempDir,
    pub gateway: Arc<StorageGateway>,
    pub publisher: Arc<MockPublisher>,
    pub router: Router,
}

impl MockContext {
    pub async fn new() -> Self {
        let (dir, gateway) = temp_gateway().await;
        let publisher = Arc::new(MockPublisher::new());

        let state = AppState::new(
            gateway.clone(),
            publisher.clone(),
            Arc::new(RecordStore::new()),
        );
        let router = router(state);

        Self {
            dir,
            gateway,
            publisher,
            router,
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }

    pub fn stored_files(&self) -> Vec<PathBuf> {
        stored_files(&self.gateway)
    }
}

async fn temp_gateway() -> (TempDir, Arc<StorageGateway>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = StorageConfig::with_upload_dir(dir.path().join("uploads").to_string_lossy());
    let gateway = Arc::new(
        StorageGateway::new(&config)
            .await
            .expect("Failed to create storage gateway"),
    );

    let probe = storage::health::check_upload_dir(&gateway).await;
    health().record_upload_dir_check(probe.err().map(|e| e.to_string()));
    (dir, gateway)
}

fn stored_files(gateway: &StorageGateway) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(gateway.base_dir())
        .expect("Failed to read upload dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .collect();
    files.sort();
    files
}

/// Polls `check` until it holds, failing the test after five seconds.
pub async fn wait_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let polled = tokio::time::timeout(Duration::from_secs(5), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "condition not reached within 5s");
}
