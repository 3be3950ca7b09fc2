//! Upload service: the producer side of the ingestion pipeline.
//!
//! Stores the raw bytes, then schedules processing by publishing an
//! [`UploadEvent`]. It never parses; the worker does that later.

use event_queue::EventPublisher;
use import_core::{Result, UploadEvent};
use std::path::PathBuf;
use std::sync::Arc;
use storage::StorageGateway;
use tracing::{error, info};

/// Stores uploads and hands them to the event queue.
pub struct UploadService {
    gateway: Arc<StorageGateway>,
    publisher: Arc<dyn EventPublisher>,
}

impl UploadService {
    pub fn new(gateway: Arc<StorageGateway>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { gateway, publisher }
    }

    /// Persists the upload and publishes an event for it.
    ///
    /// Storage errors are returned before anything is published, so a
    /// rejected upload never reaches the queue.
    pub async fn handle_file_upload(&self, bytes: &[u8], original_name: &str) -> Result<PathBuf> {
        info!(file_name = %original_name, size_bytes = bytes.len(), "Handling file upload");

        let path = self.gateway.store(bytes, original_name).await?;

        let event = UploadEvent::new(path.clone(), original_name);
        if let Err(e) = self.publisher.publish(event).await {
            error!(
                file_name = %original_name,
                path = %path.display(),
                "Failed to publish upload event: {}",
                e
            );
            return Err(e);
        }

        info!(
            file_name = %original_name,
            path = %path.display(),
            "Published file upload event"
        );
        Ok(path)
    }

    pub fn publisher_healthy(&self) -> bool {
        self.publisher.is_healthy()
    }
}
