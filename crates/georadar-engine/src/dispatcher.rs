//! Notification delivery on top of a [`NotificationSink`]

use georadar_core::error::Result;
use georadar_core::models::{
    NotificationChannel, NotificationId, Signal, SignalId, SignalNotification,
};
use georadar_core::ports::NotificationSink;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Builds notifications for signals and keeps at most one live notification
/// per signal in the tray.
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationSink>,
    channel: NotificationChannel,
    live: Mutex<HashMap<SignalId, NotificationId>>,
}

impl NotificationDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self::with_channel(sink, NotificationChannel::signals())
    }

    pub fn with_channel(sink: Arc<dyn NotificationSink>, channel: NotificationChannel) -> Self {
        Self { sink, channel, live: Mutex::new(HashMap::new()) }
    }

    fn live(&self) -> MutexGuard<'_, HashMap<SignalId, NotificationId>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn channel(&self) -> &NotificationChannel {
        &self.channel
    }

    /// Register the delivery channel with the sink
    pub async fn configure(&self) -> Result<()> {
        self.sink.configure_channel(&self.channel).await
    }

    /// Deliver a notification for `signal` and retire the previous one.
    ///
    /// The previous notification is only dismissed once the replacement was
    /// accepted by the sink.
    pub async fn dispatch(&self, signal: &Signal, distance_km: f64) -> Result<NotificationId> {
        let notification = SignalNotification::for_signal(signal, distance_km, &self.channel.id);
        let id = self.sink.notify(&notification).await?;

        let previous = self.live().insert(signal.id.clone(), id.clone());
        if let Some(previous) = previous {
            if let Err(e) = self.sink.dismiss(&previous).await {
                warn!(signal_id = %signal.id, error = %e, "Failed to dismiss previous notification");
            }
        }

        debug!(signal_id = %signal.id, notification_id = %id, "Notification delivered");
        Ok(id)
    }

    /// Identifier of the notification currently shown for `signal_id`
    pub fn live_notification(&self, signal_id: &SignalId) -> Option<NotificationId> {
        self.live().get(signal_id).cloned()
    }

    /// Remove every notification this dispatcher delivered
    pub async fn dismiss_all(&self) {
        let live: Vec<NotificationId> = self.live().drain().map(|(_, id)| id).collect();
        for id in live {
            if let Err(e) = self.sink.dismiss(&id).await {
                warn!(notification_id = %id, error = %e, "Failed to dismiss notification");
            }
        }
    }
}
