//! Upload directory health checks.

use import_core::{Error, Result};
use tokio::fs;
use tracing::{debug, error};
use uuid::Uuid;

use crate::gateway::StorageGateway;

/// Check that the upload directory exists and accepts writes.
pub async fn check_upload_dir(gateway: &StorageGateway) -> Result<()> {
    let probe = gateway
        .base_dir()
        .join(format!(".health-{}.probe", Uuid::new_v4()));

    match fs::write(&probe, b"ok").await {
        Ok(()) => {
            let _ = fs::remove_file(&probe).await;
            debug!(path = %gateway.base_dir().display(), "Upload directory healthy");
            Ok(())
        }
        Err(e) => {
            error!(
                path = %gateway.base_dir().display(),
                "Upload directory health check failed: {}",
                e
            );
            Err(Error::storage_failure(format!(
                "Upload directory {} is not writable: {}",
                gateway.base_dir().display(),
                e
            )))
        }
    }
}
