//! Upload notification passed from the upload path to the ingestion worker.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// "File uploaded" notification.
///
/// Created by the upload service once the file is fully stored, consumed
/// exactly once by the ingestion worker, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadEvent {
    /// Absolute physical location of the stored file.
    pub file_path: PathBuf,
    /// Client-supplied name, for logging only.
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
}

impl UploadEvent {
    /// Creates an event stamped with the current time.
    pub fn new(file_path: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            file_name: file_name.into(),
            uploaded_at: Utc::now(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}
