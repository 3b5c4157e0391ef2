use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::model::Reservation;
use crate::store::StoreEvent;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub the engine uses to tell UI layers that its cached
/// projection was re-derived. The payload is the store event that
/// triggered the refresh; by the time a subscriber sees it, the cache
/// already matches server truth.
pub struct NotifyHub {
    tx: broadcast::Sender<StoreEvent>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            tx: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Send a notification. No-op if nobody is listening.
    pub fn send(&self, event: StoreEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("confirmation delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Confirmation-email collaborator. Delivery is best-effort: the engine
/// spawns `send_confirmation` after a successful create, logs a failure,
/// and never lets it touch the reservation itself.
#[async_trait]
pub trait ConfirmationSender: Send + Sync {
    async fn send_confirmation(&self, reservation: &Reservation) -> Result<(), NotifyError>;
}

/// Mailer for deployments without the hosted email function.
pub struct NullMailer;

#[async_trait]
impl ConfirmationSender for NullMailer {
    async fn send_confirmation(&self, reservation: &Reservation) -> Result<(), NotifyError> {
        tracing::debug!("confirmation mail suppressed for {}", reservation.id);
        Ok(())
    }
}
