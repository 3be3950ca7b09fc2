//! Readiness of the import pipeline.
//!
//! An upload is only worth accepting when it can be stored and will be
//! picked up: the upload directory must be writable and the ingestion worker
//! must be running. Both facts are pushed here by their owners; the HTTP
//! layer only reads.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Worker state label reported before the scheduler publishes one.
pub const WORKER_STATE_UNKNOWN: &str = "idle";

/// Worker state label that counts as ready.
pub const WORKER_STATE_RUNNING: &str = "running";

/// Overall pipeline status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    /// Uploads are stored and processed.
    Ready,
    /// Uploads are stored but nothing consumes them yet (or any more).
    Accepting,
    /// Uploads cannot be stored.
    Unavailable,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Accepting => "accepting",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Point-in-time view of the registry.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: PipelineStatus,
    pub upload_dir_writable: bool,
    pub upload_dir_error: Option<String>,
    pub worker_state: &'static str,
}

/// Process-wide readiness flags.
#[derive(Debug)]
pub struct HealthRegistry {
    upload_dir_writable: AtomicBool,
    upload_dir_error: RwLock<Option<String>>,
    worker_state: RwLock<&'static str>,
}

impl HealthRegistry {
    pub const fn new() -> Self {
        Self {
            upload_dir_writable: AtomicBool::new(false),
            upload_dir_error: RwLock::new(None),
            worker_state: RwLock::new(WORKER_STATE_UNKNOWN),
        }
    }

    /// Records the outcome of an upload directory probe.
    pub fn record_upload_dir_check(&self, failure: Option<String>) {
        self.upload_dir_writable
            .store(failure.is_none(), Ordering::Relaxed);
        *self.upload_dir_error.write() = failure;
    }

    pub fn upload_dir_writable(&self) -> bool {
        self.upload_dir_writable.load(Ordering::Relaxed)
    }

    /// Publishes the scheduler's current lifecycle label.
    pub fn set_worker_state(&self, state: &'static str) {
        *self.worker_state.write() = state;
    }

    pub fn worker_state(&self) -> &'static str {
        *self.worker_state.read()
    }

    pub fn worker_running(&self) -> bool {
        self.worker_state() == WORKER_STATE_RUNNING
    }

    pub fn status(&self) -> PipelineStatus {
        match (self.upload_dir_writable(), self.worker_running()) {
            (true, true) => PipelineStatus::Ready,
            (true, false) => PipelineStatus::Accepting,
            (false, _) => PipelineStatus::Unavailable,
        }
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            status: self.status(),
            upload_dir_writable: self.upload_dir_writable(),
            upload_dir_error: self.upload_dir_error.read().clone(),
            worker_state: self.worker_state(),
        }
    }

    /// Uploads will be stored and processed.
    pub fn is_ready(&self) -> bool {
        self.status() == PipelineStatus::Ready
    }
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static HEALTH: HealthRegistry = HealthRegistry::new();

/// Get the global health registry.
pub fn health() -> &'static HealthRegistry {
    &HEALTH
}
