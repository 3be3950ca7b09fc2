//! Lifecycle of the background ingestion worker.
//!
//! Idle → Running → Stopping → Stopped. The worker starts once and only
//! stops on an explicit shutdown request.

use event_queue::EventQueue;
use import_core::{Error, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use telemetry::health;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::ingestion::IngestionWorker;

/// Worker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Not yet started.
    Idle,
    /// Looping over queue events.
    Running,
    /// Shutdown requested; finishing the current event.
    Stopping,
    /// Terminal.
    Stopped,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }
}

/// Stores the new state and mirrors it into the health registry.
fn set_state(current: &mut WorkerState, next: WorkerState) {
    *current = next;
    health().set_worker_state(next.as_str());
}

/// Worker scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Upper bound on waiting for the in-flight event at shutdown
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl WorkerConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Owns the single ingestion worker task.
pub struct WorkerScheduler {
    config: WorkerConfig,
    worker: Arc<IngestionWorker>,
    queue: Arc<EventQueue>,
    state: Arc<Mutex<WorkerState>>,
    cancel: CancellationToken,
    handle: tokio::sync::Mutex<Option<JoinHandle<usize>>>,
}

impl WorkerScheduler {
    pub fn new(config: WorkerConfig, worker: Arc<IngestionWorker>, queue: Arc<EventQueue>) -> Self {
        Self {
            config,
            worker,
            queue,
            state: Arc::new(Mutex::new(WorkerState::Idle)),
            cancel: CancellationToken::new(),
            handle: tokio::sync::Mutex::new(None),
        }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock()
    }

    /// Subscribes to the queue and spawns the worker loop.
    ///
    /// Only valid from `Idle`; must be called inside a Tokio runtime.
    pub fn start(&self) -> Result<()> {
        let mut state = self.state.lock();
        if *state != WorkerState::Idle {
            return Err(Error::worker_state(format!(
                "cannot start worker in state {:?}",
                *state
            )));
        }

        let subscription = self.queue.subscribe()?;
        let worker = self.worker.clone();
        let cancel = self.cancel.clone();
        let task_state = self.state.clone();

        let handle = tokio::spawn(async move {
            let handled = worker.run(subscription, cancel).await;
            set_state(&mut task_state.lock(), WorkerState::Stopped);
            handled
        });

        // The lock is free: start() is the only place that fills the slot
        match self.handle.try_lock() {
            Ok(mut slot) => *slot = Some(handle),
            Err(_) => {
                handle.abort();
                return Err(Error::worker_state("worker handle is busy"));
            }
        }

        set_state(&mut state, WorkerState::Running);
        info!("Ingestion worker started");
        Ok(())
    }

    /// Cancels the wait for the next event without waiting for the loop.
    pub fn request_shutdown(&self) {
        let mut state = self.state.lock();
        match *state {
            WorkerState::Idle => set_state(&mut state, WorkerState::Stopped),
            WorkerState::Running => set_state(&mut state, WorkerState::Stopping),
            WorkerState::Stopping | WorkerState::Stopped => {}
        }
        self.cancel.cancel();
    }

    /// Requests shutdown and waits for the loop to exit.
    ///
    /// The in-flight event, if any, finishes first. Waiting is bounded by
    /// `shutdown_timeout`; past it the loop task is aborted. Idempotent.
    /// Returns the number of events the loop handled, when it was awaited.
    pub async fn shutdown(&self) -> Option<usize> {
        info!("Shutting down ingestion worker...");
        self.request_shutdown();

        let mut handle = self.handle.lock().await.take()?;
        let timeout = self.config.shutdown_timeout();

        let handled = match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(handled)) => Some(handled),
            Ok(Err(e)) => {
                warn!("Ingestion worker task ended abnormally: {}", e);
                None
            }
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs(), "Ingestion worker did not stop in time, aborting");
                handle.abort();
                None
            }
        };

        set_state(&mut self.state.lock(), WorkerState::Stopped);
        handled
    }
}
