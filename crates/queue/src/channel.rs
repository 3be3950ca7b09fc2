//! Unbounded FIFO channel of upload events.

use import_core::{Error, Result, UploadEvent};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use telemetry::metrics;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

type ReceiverSlot = Arc<Mutex<Option<UnboundedReceiver<UploadEvent>>>>;

/// In-process queue of [`UploadEvent`]s.
///
/// `publish` never suspends: capacity is unbounded. Dequeue happens through a
/// [`Subscription`]; only one may be active at a time.
pub struct EventQueue {
    /// The only sender. Dropping it (on close) lets receivers drain and stop.
    sender: RwLock<Option<UnboundedSender<UploadEvent>>>,
    /// Receiver parked here while nobody is subscribed.
    receiver: ReceiverSlot,
    depth: Arc<AtomicUsize>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sender: RwLock::new(Some(tx)),
            receiver: Arc::new(Mutex::new(Some(rx))),
            depth: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Enqueues an event and returns immediately.
    ///
    /// Fails with [`Error::QueueClosed`] once [`close`](Self::close) was called.
    pub fn publish(&self, event: UploadEvent) -> Result<()> {
        let sender = self.sender.read();
        let sender = sender.as_ref().ok_or(Error::QueueClosed)?;

        debug!(file_name = %event.file_name, path = %event.file_path.display(), "Publishing upload event");

        // Count before sending so a fast consumer never sees the depth underflow
        self.depth.fetch_add(1, Ordering::SeqCst);
        metrics().queue_depth.inc();

        if sender.send(event).is_err() {
            self.depth.fetch_sub(1, Ordering::SeqCst);
            metrics().queue_depth.dec();
            return Err(Error::QueueClosed);
        }

        metrics().events_published.inc();
        Ok(())
    }

    /// Takes the single consumer handle.
    ///
    /// Fails while another [`Subscription`] is alive. Dropping the
    /// subscription makes the queue subscribable again, from the same position.
    pub fn subscribe(&self) -> Result<Subscription> {
        let receiver = self
            .receiver
            .lock()
            .take()
            .ok_or_else(|| Error::internal("event queue already has an active subscription"))?;

        debug!("Event queue subscribed");

        Ok(Subscription {
            receiver: Some(receiver),
            slot: self.receiver.clone(),
            depth: self.depth.clone(),
        })
    }

    /// Stops accepting events.
    ///
    /// Events already queued are still delivered; after that, dequeue returns
    /// `None` instead of waiting. Idempotent.
    pub fn close(&self) {
        if self.sender.write().take().is_some() {
            info!(pending = self.len(), "Event queue closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.read().is_none()
    }

    /// Number of events published but not yet dequeued.
    pub fn len(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer side of an [`EventQueue`].
pub struct Subscription {
    receiver: Option<UnboundedReceiver<UploadEvent>>,
    slot: ReceiverSlot,
    depth: Arc<AtomicUsize>,
}

impl Subscription {
    /// Waits for the next event in publish order.
    ///
    /// Returns `None` once the queue is closed and drained. Cancel safe: an
    /// event is never lost if this future is dropped before completing.
    pub async fn recv(&mut self) -> Option<UploadEvent> {
        let event = self.receiver.as_mut()?.recv().await?;
        self.depth.fetch_sub(1, Ordering::SeqCst);
        metrics().queue_depth.dec();
        Some(event)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(receiver) = self.receiver.take() {
            *self.slot.lock() = Some(receiver);
            debug!("Event queue subscription released");
        }
    }
}
