//! Application state shared across handlers.

use event_queue::EventPublisher;
use import_core::limits::DEFAULT_MAX_UPLOAD_BYTES;
use std::sync::Arc;
use storage::{RecordStore, StorageGateway};

use crate::upload::UploadService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Store-then-publish upload path
    pub uploads: Arc<UploadService>,
    /// Imported users, read by the reporting routes
    pub records: Arc<RecordStore>,
    /// Request body limit for the upload route
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        gateway: Arc<StorageGateway>,
        publisher: Arc<dyn EventPublisher>,
        records: Arc<RecordStore>,
    ) -> Self {
        Self {
            uploads: Arc::new(UploadService::new(gateway, publisher)),
            records,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
