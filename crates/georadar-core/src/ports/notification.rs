use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NotificationChannel, NotificationId, SignalNotification};

/// Port for the OS notification tray
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a notification immediately
    async fn notify(&self, notification: &SignalNotification) -> Result<NotificationId>;

    /// Remove a delivered notification
    async fn dismiss(&self, id: &NotificationId) -> Result<()>;

    /// Create or update a delivery channel. Platforms without channels ignore this.
    async fn configure_channel(&self, _channel: &NotificationChannel) -> Result<()> {
        Ok(())
    }
}
