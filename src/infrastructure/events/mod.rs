//! Background Events
//!
//! A bounded FIFO queue of notifications drained by one background task.
//! Producers publish [`Event`]s from request handlers; the consumer calls
//! each event's [`Notifier`] in arrival order. A failed notifier is
//! logged and skipped; there is no retry and no dead-letter queue.

mod notifiers;
mod pool;

use async_trait::async_trait;
use sqlx::PgPool;

pub use notifiers::BatchEnrollmentNotifier;
pub use pool::{EventPool, EventPublisher, DEFAULT_QUEUE_CAPACITY};

/// Errors raised while queueing or delivering events.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// `try_publish` found the queue at capacity.
    #[error("event queue is full")]
    QueueFull,

    /// The pool has shut down.
    #[error("event queue is closed")]
    Closed,

    #[error("notifier failed: {0}")]
    Notify(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Side effect run by the event consumer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, db: &PgPool) -> Result<(), EventError>;
}

/// A queued notification and the pool it should use.
pub struct Event {
    pub notifier: Box<dyn Notifier>,
    pub db: PgPool,
}

impl Event {
    pub fn new(notifier: impl Notifier + 'static, db: PgPool) -> Self {
        Self {
            notifier: Box::new(notifier),
            db,
        }
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event").finish_non_exhaustive()
    }
}
