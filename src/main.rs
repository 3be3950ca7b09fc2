//! User Import Service
//!
//! Accepts CSV uploads over HTTP and imports them in the background:
//! - Uploads are stored on disk and announced on an in-process event queue
//! - A single worker parses each file, upserts valid users, and deletes it
//! - Imported users are served from an in-memory record store

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use api::{router, AppState};
use event_queue::EventQueue;
use import_core::CsvParser;
use storage::{RecordStore, StorageConfig, StorageGateway};
use telemetry::{health, init_tracing_from_env};
use worker::{IngestionWorker, WorkerConfig, WorkerScheduler};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    storage: StorageConfig,

    #[serde(default)]
    worker: WorkerConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage: StorageConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting User Import Service v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    info!(
        upload_dir = %config.storage.upload_dir,
        max_upload_bytes = config.storage.max_upload_bytes,
        shutdown_timeout_secs = config.worker.shutdown_timeout_secs,
        "Loaded configuration"
    );

    // Storage gateway creates and canonicalizes the upload directory
    let gateway = Arc::new(
        StorageGateway::new(&config.storage)
            .await
            .context("Failed to initialize upload storage")?,
    );
    check_health(&gateway).await;

    let records = Arc::new(RecordStore::new());
    let queue = Arc::new(EventQueue::new());

    let ingestion = Arc::new(IngestionWorker::new(
        Arc::new(CsvParser::new()),
        records.clone(),
        gateway.clone(),
    ));
    let scheduler = WorkerScheduler::new(config.worker.clone(), ingestion, queue.clone());

    let state = AppState::new(gateway.clone(), queue.clone(), records.clone())
        .with_max_upload_bytes(config.storage.max_upload_bytes);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Listening on http://{}", addr);

    // The worker only starts once the server is able to accept uploads
    scheduler
        .start()
        .context("Failed to start ingestion worker")?;

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");

    info!("Shutting down...");

    queue.close();
    match scheduler.shutdown().await {
        Some(handled) => info!(handled = handled, "Ingestion worker stopped"),
        None => warn!("Ingestion worker did not report a clean stop"),
    }

    if !queue.is_empty() {
        warn!(
            pending = queue.len(),
            "Unprocessed upload events dropped at shutdown"
        );
    }

    served?;
    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("USER_IMPORT")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(upload_dir) = std::env::var("USER_IMPORT_UPLOAD_DIR") {
        config.storage.upload_dir = upload_dir;
    }
    if let Ok(host) = std::env::var("USER_IMPORT_HOST") {
        config.host = host;
    }
    if let Ok(port) = std::env::var("USER_IMPORT_PORT") {
        config.port = port
            .parse()
            .with_context(|| format!("Invalid USER_IMPORT_PORT: {}", port))?;
    }

    Ok(config)
}

/// Check component health on startup.
async fn check_health(gateway: &StorageGateway) {
    match storage::health::check_upload_dir(gateway).await {
        Ok(()) => {
            health().record_upload_dir_check(None);
            info!("Upload directory: healthy");
        }
        Err(e) => {
            error!("Upload directory: unhealthy");
            health().record_upload_dir_check(Some(e.to_string()));
        }
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
