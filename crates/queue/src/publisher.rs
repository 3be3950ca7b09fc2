//! Producer-side abstraction over the event queue.

use async_trait::async_trait;
use import_core::{Result, UploadEvent};

use crate::channel::EventQueue;

/// Trait for publishing upload events.
///
/// The upload path depends on this rather than on [`EventQueue`] so that a
/// durable broker, or a capturing mock in tests, can stand in.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Hands an event to the queue. Must not wait for it to be consumed.
    async fn publish(&self, event: UploadEvent) -> Result<()>;

    /// Whether the publisher currently accepts events.
    fn is_healthy(&self) -> bool;
}

#[async_trait]
impl EventPublisher for EventQueue {
    async fn publish(&self, event: UploadEvent) -> Result<()> {
        EventQueue::publish(self, event)
    }

    fn is_healthy(&self) -> bool {
        !self.is_closed()
    }
}
