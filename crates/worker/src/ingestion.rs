//! Ingestion worker: upload events → CSV parse → record store → cleanup.
//!
//! Everything that goes wrong while handling one event stays inside that
//! event. The loop keeps running and the source file is always deleted.

use event_queue::Subscription;
use import_core::{Error, ParseResult, Result, RowError, RowParser, UploadEvent};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use storage::{CleanupOutcome, RecordStore, StorageGateway};
use telemetry::metrics;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// What happened to one upload event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub file_name: String,
    /// Valid records upserted into the store.
    pub imported: usize,
    /// Row errors reported by the parser (including a row-0 file error).
    pub row_errors: usize,
    /// Set when processing itself failed rather than returning row errors.
    pub failure: Option<String>,
    pub cleanup: CleanupOutcome,
}

/// Processes upload events one at a time.
pub struct IngestionWorker {
    parser: Arc<dyn RowParser>,
    records: Arc<RecordStore>,
    gateway: Arc<StorageGateway>,
}

impl IngestionWorker {
    pub fn new(
        parser: Arc<dyn RowParser>,
        records: Arc<RecordStore>,
        gateway: Arc<StorageGateway>,
    ) -> Self {
        Self {
            parser,
            records,
            gateway,
        }
    }

    /// Main loop: wait for an event, process it fully, repeat.
    ///
    /// Cancellation is only observed while waiting, so an event that has been
    /// dequeued always finishes, cleanup included. Returns the number of
    /// events handled.
    pub async fn run(
        self: Arc<Self>,
        mut subscription: Subscription,
        cancel: CancellationToken,
    ) -> usize {
        info!("CSV processing worker started");
        let mut handled = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("CSV processing worker cancelled while waiting for events");
                    break;
                }
                next = subscription.recv() => next,
            };

            let Some(event) = next else {
                info!("Event queue closed, CSV processing worker exiting");
                break;
            };

            Self::handle_isolated(&self, event).await;
            handled += 1;
        }

        drop(subscription);
        info!(handled = handled, "CSV processing worker stopped");
        handled
    }

    /// Runs one event on its own task so a panic cannot take the loop down.
    async fn handle_isolated(this: &Arc<Self>, event: UploadEvent) {
        let file_name = event.file_name.clone();
        let file_path = event.file_path.clone();
        let worker = this.clone();

        if let Err(e) = tokio::spawn(async move { worker.process_event(event).await }).await {
            error!(file_name = %file_name, "Failed to process file {}: {}", file_name, e);
            metrics().files_failed.inc();
            this.cleanup(&file_path).await;
        }
    }

    /// Processes a single event and always attempts to delete its file.
    pub async fn process_event(&self, event: UploadEvent) -> ProcessOutcome {
        info!(
            file_name = %event.file_name,
            path = %event.file_path.display(),
            uploaded_at = %event.uploaded_at,
            "Processing file upload event"
        );
        let start = Instant::now();

        let (imported, row_errors, failure) = match self.import(&event).await {
            Ok((imported, row_errors)) => {
                metrics().files_processed.inc();
                (imported, row_errors, None)
            }
            Err(e) => {
                error!(file_name = %event.file_name, "Failed to process file {}: {}", event.file_name, e);
                metrics().files_failed.inc();
                (0, 0, Some(e.to_string()))
            }
        };

        let cleanup = self.cleanup(&event.file_path).await;

        metrics()
            .file_processing_ms
            .observe(start.elapsed().as_millis() as u64);
        info!(file_name = %event.file_name, "Processing completed for file: {}", event.file_name);

        ProcessOutcome {
            file_name: event.file_name,
            imported,
            row_errors,
            failure,
            cleanup,
        }
    }

    /// Parse → report → store. Returns (imported, row errors).
    async fn import(&self, event: &UploadEvent) -> Result<(usize, usize)> {
        let parsed = match self.gateway.resolve(event.path()).await {
            Ok(path) => {
                let parser = self.parser.clone();
                // File reads block; keep them off the async workers
                tokio::task::spawn_blocking(move || parser.parse(&path))
                    .await
                    .map_err(|e| Error::internal(format!("CSV parser failed: {}", e)))?
            }
            Err(Error::NotFound(message)) => ParseResult::file_error(message),
            Err(e) => ParseResult::file_error(format!("Failed to read CSV file: {}", e)),
        };

        if parsed.has_errors() {
            self.report_row_errors(event, &parsed.errors);
        }

        let ParseResult { records, errors } = parsed;

        if records.is_empty() {
            warn!(file_name = %event.file_name, "No valid users found in file: {}", event.file_name);
            return Ok((0, errors.len()));
        }

        let imported = self.records.upsert_all(records.iter().cloned());
        metrics().users_imported.inc_by(imported as u64);

        info!(
            count = imported,
            file_name = %event.file_name,
            "Successfully imported {} user(s) from {}",
            imported,
            event.file_name
        );
        for user in &records {
            info!(
                id = %user.id(),
                first_name = %user.first_name(),
                last_name = %user.last_name(),
                email = %user.email(),
                "Imported user"
            );
        }

        Ok((imported, errors.len()))
    }

    /// Row errors are observability only; they never fail the event.
    fn report_row_errors(&self, event: &UploadEvent, errors: &[RowError]) {
        warn!(
            file_name = %event.file_name,
            count = errors.len(),
            "Encountered {} error(s) while parsing CSV",
            errors.len()
        );
        for row_error in errors {
            warn!(
                row_number = row_error.row_number,
                message = %row_error.message,
                "  Row {}: {}",
                row_error.row_number,
                row_error.message
            );
        }
        metrics().row_errors.inc_by(errors.len() as u64);
    }

    /// Deletes the source file; failures are logged and swallowed.
    async fn cleanup(&self, path: &Path) -> CleanupOutcome {
        let outcome = self.gateway.delete(path).await;
        if let CleanupOutcome::Failed { path, error } = &outcome {
            error!(path = %path.display(), "Failed to cleanup file: {}", error);
            metrics().cleanup_failures.inc();
        }
        outcome
    }
}
