use crate::RemoteError;
use async_trait::async_trait;
use serde::Serialize;

/// A rendered notification, ready for delivery
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Envelope {
    /// The recipient's address
    pub to: String,
    /// The sender's address
    pub from: String,
    pub subject: String,
    pub body: String,
}

/// Delivers notifications to members
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver a single notification, waiting until it is accepted or refused
    async fn send(&self, envelope: &Envelope) -> Result<(), RemoteError>;
}
