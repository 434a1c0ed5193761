use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{Event, EventError};

/// Queue size used when none is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Cloneable producer handle onto an [`EventPool`].
#[derive(Debug, Clone)]
pub struct EventPublisher {
    tx: mpsc::Sender<Event>,
}

impl EventPublisher {
    /// Enqueue an event, waiting while the queue is full.
    pub async fn publish(&self, event: Event) -> Result<(), EventError> {
        self.tx.send(event).await.map_err(|_| EventError::Closed)
    }

    /// Enqueue an event without waiting.
    pub fn try_publish(&self, event: Event) -> Result<(), EventError> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Event queue full, rejecting event");
                Err(EventError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(EventError::Closed),
        }
    }
}

/// Bounded event queue with exactly one consumer task.
pub struct EventPool {
    publisher: EventPublisher,
    stop: Option<oneshot::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl EventPool {
    /// Spawn the consumer. Must be called from within a tokio runtime.
    pub fn start(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let (stop_tx, stop_rx) = oneshot::channel();

        let worker = tokio::spawn(async move {
            Self::worker_loop(rx, stop_rx).await;
        });
        tracing::info!(capacity, "Event pool started");

        Self {
            publisher: EventPublisher { tx },
            stop: Some(stop_tx),
            worker: Some(worker),
        }
    }

    pub fn publisher(&self) -> EventPublisher {
        self.publisher.clone()
    }

    pub async fn publish(&self, event: Event) -> Result<(), EventError> {
        self.publisher.publish(event).await
    }

    pub fn try_publish(&self, event: Event) -> Result<(), EventError> {
        self.publisher.try_publish(event)
    }

    async fn worker_loop(mut rx: mpsc::Receiver<Event>, mut stop: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                biased;
                event = rx.recv() => match event {
                    Some(event) => Self::deliver(event).await,
                    None => break,
                },
                _ = &mut stop => {
                    // Refuse new events, then drain what is already queued.
                    rx.close();
                    while let Some(event) = rx.recv().await {
                        Self::deliver(event).await;
                    }
                    break;
                }
            }
        }
        tracing::debug!("Event worker loop exited");
    }

    async fn deliver(event: Event) {
        if let Err(e) = event.notifier.notify(&event.db).await {
            tracing::error!(error = %e, "Event notifier failed");
        }
    }

    /// Stop accepting events, deliver everything already queued, and wait
    /// for the consumer to exit.
    pub async fn shutdown(mut self) -> Result<(), EventError> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.worker.take() {
            handle
                .await
                .map_err(|e| EventError::Notify(format!("event worker panicked: {}", e)))?;
        }
        tracing::info!("Event pool shutdown complete");
        Ok(())
    }
}

impl Drop for EventPool {
    fn drop(&mut self) {
        if self.worker.is_some() {
            tracing::warn!("EventPool dropped without calling shutdown(); queued events may be lost");
        }
    }
}

impl std::fmt::Debug for EventPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPool")
            .field("running", &self.worker.is_some())
            .finish()
    }
}
