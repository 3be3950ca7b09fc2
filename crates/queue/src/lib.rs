//! In-process event queue carrying upload notifications to the ingestion worker.
//!
//! Unbounded, FIFO, many producers and one active subscription. A durable
//! broker can replace it behind [`EventPublisher`] and [`EventQueue::subscribe`].

pub mod channel;
pub mod publisher;

pub use channel::*;
pub use publisher::*;
