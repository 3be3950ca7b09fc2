//! File upload endpoint.
//!
//! Validates the multipart upload, stores it, and schedules processing.
//! Parsing happens later in the worker, so a 200 here only means the file
//! was accepted.

use axum::{extract::State, Json};
use import_core::limits::CSV_EXTENSION;
use std::time::Instant;
use telemetry::metrics;
use tracing::{info, warn};

use crate::extractors::FileUpload;
use crate::response::{ApiError, UploadResponse};
use crate::state::AppState;

/// POST /api/files/upload
pub async fn upload_handler(
    State(state): State<AppState>,
    upload: Result<FileUpload, ApiError>,
) -> Result<Json<UploadResponse>, ApiError> {
    let start = Instant::now();
    metrics().uploads_received.inc();

    let result = accept(&state, upload).await;

    match &result {
        Ok(file_name) => info!(
            file_name = %file_name,
            latency_ms = start.elapsed().as_millis() as u64,
            "Upload accepted"
        ),
        Err(e) => {
            metrics().uploads_rejected.inc();
            warn!(code = %e.response.code, "Upload rejected: {}", e.response.message);
        }
    }

    result.map(|_| Json(UploadResponse::accepted()))
}

async fn accept(state: &AppState, upload: Result<FileUpload, ApiError>) -> Result<String, ApiError> {
    let FileUpload { file_name, bytes } = upload?;

    if bytes.is_empty() {
        return Err(ApiError::bad_request("File is empty"));
    }

    if !has_csv_extension(&file_name) {
        return Err(ApiError::bad_request("Only CSV files are allowed"));
    }

    state
        .uploads
        .handle_file_upload(&bytes, &file_name)
        .await
        .map_err(ApiError::upload_failed)?;

    Ok(file_name)
}

fn has_csv_extension(file_name: &str) -> bool {
    file_name
        .to_ascii_lowercase()
        .ends_with(CSV_EXTENSION)
}
