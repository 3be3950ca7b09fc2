//! Request extractors.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::StatusCode,
};
use import_core::limits::FALLBACK_FILE_NAME;

use crate::response::ApiError;

/// Multipart form field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// The `file` part of a multipart upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Client-supplied name, or `unknown.csv` when none was sent
    pub file_name: String,
    pub bytes: Bytes,
}

#[async_trait]
impl<S> FromRequest<S> for FileUpload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?
        {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let file_name = field
                .file_name()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(FALLBACK_FILE_NAME)
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;

            return Ok(FileUpload { file_name, bytes });
        }

        Err(ApiError::bad_request("Missing multipart field 'file'"))
    }
}

/// Malformed or oversized multipart bodies keep axum's status (400 or 413).
fn rejected(status: StatusCode, message: String) -> ApiError {
    ApiError::with_code(status, "VALID_001", message)
}
