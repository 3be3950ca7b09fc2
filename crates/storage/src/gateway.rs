//! Filesystem storage for raw uploads.
//!
//! Uploads are written under a single base directory as
//! `{uuid}_{original-name}`. The random prefix is the only thing keeping
//! concurrent uploads of the same name apart; the directory is never locked.

use import_core::{Error, Result};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::StorageConfig;

/// Result of a best-effort delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    Deleted(PathBuf),
    /// Nothing was there; not an error.
    Missing(PathBuf),
    /// The delete was attempted and failed. Logged, never propagated.
    Failed { path: PathBuf, error: String },
}

impl CleanupOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Local filesystem gateway for uploaded files.
#[derive(Debug, Clone)]
pub struct StorageGateway {
    base_dir: PathBuf,
}

impl StorageGateway {
    /// Creates the gateway, creating the base directory if it is absent.
    ///
    /// The directory is resolved against the working directory and
    /// canonicalized, so every path handed out is absolute.
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let requested = absolute(Path::new(&config.upload_dir))?;

        if !fs::try_exists(&requested).await.unwrap_or(false) {
            fs::create_dir_all(&requested).await.map_err(|e| {
                Error::storage_failure(format!(
                    "Failed to create upload directory {}: {}",
                    requested.display(),
                    e
                ))
            })?;
            info!(path = %requested.display(), "Created upload directory");
        }

        let base_dir = fs::canonicalize(&requested).await.map_err(|e| {
            Error::storage_failure(format!(
                "Failed to resolve upload directory {}: {}",
                requested.display(),
                e
            ))
        })?;

        info!(path = %base_dir.display(), "Upload directory");
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Persists an upload and returns its absolute physical path.
    ///
    /// The payload is written to a hidden part file, synced, and renamed into
    /// place, so the returned path always names a complete file.
    pub async fn store(&self, bytes: &[u8], original_name: &str) -> Result<PathBuf> {
        if bytes.is_empty() {
            return Err(Error::invalid_input("File is empty"));
        }

        let name = file_name_component(original_name).ok_or_else(|| {
            Error::invalid_input(format!("Invalid file name: {:?}", original_name))
        })?;

        fs::create_dir_all(&self.base_dir).await.map_err(|e| {
            Error::storage_failure(format!(
                "Failed to create upload directory {}: {}",
                self.base_dir.display(),
                e
            ))
        })?;

        let stored_name = format!("{}_{}", Uuid::new_v4(), name);
        let path = self.base_dir.join(&stored_name);
        let part_path = self.base_dir.join(format!(".{}.part", stored_name));
        let start = Instant::now();

        if let Err(e) = write_synced(&part_path, bytes).await {
            let _ = fs::remove_file(&part_path).await;
            return Err(Error::storage_failure(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            )));
        }

        if let Err(e) = fs::rename(&part_path, &path).await {
            let _ = fs::remove_file(&part_path).await;
            return Err(Error::storage_failure(format!(
                "Failed to move file into place {}: {}",
                path.display(),
                e
            )));
        }

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(Error::storage_failure(format!(
                "File was not saved: {}",
                path.display()
            )));
        }

        info!(
            path = %path.display(),
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File stored successfully"
        );

        Ok(path)
    }

    /// Resolves a stored path to an existing file.
    pub async fn resolve(&self, path: &Path) -> Result<PathBuf> {
        let normalized = absolute(path)?;

        match fs::canonicalize(&normalized).await {
            Ok(resolved) => Ok(resolved),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::not_found(format!(
                "File not found: {} (resolved to: {})",
                path.display(),
                normalized.display()
            ))),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Removes a stored file. Best effort: never returns an error.
    pub async fn delete(&self, path: &Path) -> CleanupOutcome {
        let normalized = match absolute(path) {
            Ok(p) => p,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to delete file");
                return CleanupOutcome::Failed {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                };
            }
        };

        match fs::remove_file(&normalized).await {
            Ok(()) => {
                info!(path = %normalized.display(), "Deleted file");
                CleanupOutcome::Deleted(normalized)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %normalized.display(), "File not found for deletion");
                CleanupOutcome::Missing(normalized)
            }
            Err(e) => {
                error!(path = %normalized.display(), error = %e, "Failed to delete file");
                CleanupOutcome::Failed {
                    path: normalized,
                    error: e.to_string(),
                }
            }
        }
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    debug!(path = %path.display(), "Part file synced");
    Ok(())
}

/// Last component of a client-supplied name, so it cannot escape the base dir.
fn file_name_component(original_name: &str) -> Option<&str> {
    let candidate = original_name.rsplit(|c: char| c == '/' || c == '\\').next()?.trim();
    match candidate {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

/// Makes `path` absolute against the working directory and removes `.`/`..`
/// lexically. The target does not need to exist.
fn absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(normalize(&joined))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
