//! Mock implementations for testing.

use async_trait::async_trait;
use event_queue::EventPublisher;
use import_core::{CsvParser, ParseResult, Result, RowParser, UploadEvent};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tokio::sync::mpsc as async_mpsc;

/// Mock publisher that captures events in memory.
///
/// Implements the same `EventPublisher` trait as `EventQueue`, so the upload
/// path can be checked without a worker consuming anything.
#[derive(Clone)]
pub struct MockPublisher {
    /// All events published through this mock.
    events: Arc<Mutex<Vec<UploadEvent>>>,
    /// Simulate failures if set.
    should_fail: Arc<Mutex<bool>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn captured_events(&self) -> Vec<UploadEvent> {
        self.events.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for MockPublisher {
    async fn publish(&self, event: UploadEvent) -> Result<()> {
        if *self.should_fail.lock() {
            return Err(import_core::Error::internal("Mock publisher failure"));
        }
        self.events.lock().push(event);
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        !*self.should_fail.lock()
    }
}

/// CSV parser that parks inside `parse` until the test lets it go.
///
/// Each call reports its path through the [`Gate`], then blocks until one
/// release is sent (or the gate is dropped) before parsing for real.
pub struct GatedParser {
    inner: CsvParser,
    entered: async_mpsc::UnboundedSender<PathBuf>,
    release: Mutex<mpsc::Receiver<()>>,
}

/// Test-side handle of a [`GatedParser`].
pub struct Gate {
    entered: async_mpsc::UnboundedReceiver<PathBuf>,
    release: mpsc::Sender<()>,
}

impl GatedParser {
    pub fn new() -> (Self, Gate) {
        let (entered_tx, entered_rx) = async_mpsc::unbounded_channel();
        let (release_tx, release_rx) = mpsc::channel();

        let parser = Self {
            inner: CsvParser::new(),
            entered: entered_tx,
            release: Mutex::new(release_rx),
        };
        let gate = Gate {
            entered: entered_rx,
            release: release_tx,
        };
        (parser, gate)
    }
}

impl RowParser for GatedParser {
    fn parse(&self, path: &Path) -> ParseResult {
        let _ = self.entered.send(path.to_path_buf());
        // A dropped gate releases everything
        let _ = self.release.lock().recv();
        self.inner.parse(path)
    }
}

impl Gate {
    /// Waits until the worker is inside `parse`; returns the file it is on.
    pub async fn entered(&mut self) -> PathBuf {
        tokio::time::timeout(Duration::from_secs(5), self.entered.recv())
            .await
            .expect("worker never reached the parser")
            .expect("parser was dropped")
    }

    /// Lets one parked `parse` call continue.
    pub fn release(&self) {
        let _ = self.release.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_publisher_captures_events() {
        let mock = MockPublisher::new();
        mock.publish(UploadEvent::new("/tmp/a.csv", "a.csv")).await.unwrap();

        assert_eq!(mock.event_count(), 1);
        assert_eq!(mock.captured_events()[0].file_name, "a.csv");
    }

    #[tokio::test]
    async fn test_mock_publisher_failure_mode() {
        let mock = MockPublisher::new();
        mock.set_should_fail(true);

        assert!(mock.publish(UploadEvent::new("/tmp/a.csv", "a.csv")).await.is_err());
        assert!(!mock.is_healthy());
        assert_eq!(mock.event_count(), 0);
    }

    #[tokio::test]
    async fn test_gated_parser_waits_for_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "h\n1,Ann,Lee,ann@x.com\n").unwrap();

        let (parser, mut gate) = GatedParser::new();
        let parser = Arc::new(parser);

        let task = {
            let parser = parser.clone();
            let path = path.clone();
            tokio::task::spawn_blocking(move || parser.parse(&path))
        };

        assert_eq!(gate.entered().await, path);
        assert!(!task.is_finished());

        gate.release();
        let result = task.await.unwrap();
        assert_eq!(result.records.len(), 1);
    }
}
