//! In-memory notification sink for development and testing.
//!
//! Uses `Mutex::unwrap()` intentionally. Lock poisoning only occurs when
//! another thread panicked while holding the lock.

use async_trait::async_trait;
use georadar_core::error::{GeoradarError, Result};
use georadar_core::models::{NotificationChannel, NotificationId, SignalId, SignalNotification};
use georadar_core::ports::NotificationSink;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct SinkState {
    delivered: Vec<(NotificationId, SignalNotification)>,
    live: HashMap<NotificationId, SignalId>,
    dismissed: Vec<NotificationId>,
    channels: Vec<NotificationChannel>,
}

/// Records every notification instead of showing it
#[derive(Debug, Clone, Default)]
pub struct MemoryNotificationSink {
    state: Arc<Mutex<SinkState>>,
    failing: Arc<AtomicBool>,
}

impl MemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `notify` calls fail until reset
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every notification delivered so far, oldest first
    pub fn delivered(&self) -> Vec<SignalNotification> {
        self.state.lock().unwrap().delivered.iter().map(|(_, n)| n.clone()).collect()
    }

    pub fn delivered_count(&self) -> usize {
        self.state.lock().unwrap().delivered.len()
    }

    /// Number of deliveries for one signal
    pub fn count_for(&self, signal_id: &SignalId) -> usize {
        self.state
            .lock()
            .unwrap()
            .delivered
            .iter()
            .filter(|(_, n)| &n.signal_id == signal_id)
            .count()
    }

    /// Notifications delivered and not dismissed
    pub fn live_count(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    pub fn dismissed(&self) -> Vec<NotificationId> {
        self.state.lock().unwrap().dismissed.clone()
    }

    pub fn channels(&self) -> Vec<NotificationChannel> {
        self.state.lock().unwrap().channels.clone()
    }
}

#[async_trait]
impl NotificationSink for MemoryNotificationSink {
    async fn notify(&self, notification: &SignalNotification) -> Result<NotificationId> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GeoradarError::NotificationDispatch {
                reason: "notification sink unavailable".to_string(),
            });
        }

        let id = NotificationId(uuid::Uuid::new_v4().to_string());
        let mut state = self.state.lock().unwrap();
        state.delivered.push((id.clone(), notification.clone()));
        state.live.insert(id.clone(), notification.signal_id.clone());
        Ok(id)
    }

    async fn dismiss(&self, id: &NotificationId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.live.remove(id).is_some() {
            state.dismissed.push(id.clone());
        }
        Ok(())
    }

    async fn configure_channel(&self, channel: &NotificationChannel) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.channels.retain(|c| c.id != channel.id);
        state.channels.push(channel.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use georadar_core::models::{Coordinate, Signal};

    fn notification() -> SignalNotification {
        let signal = Signal::event(
            "5",
            "Lulu Hypermarket Event",
            Coordinate::new(25.0283, 55.2095),
            Utc::now(),
            "Special event ending at Lulu Hypermarket",
        );
        SignalNotification::for_signal(&signal, 0.3, NotificationChannel::SIGNALS)
    }

    #[tokio::test]
    async fn test_notify_and_dismiss() {
        let sink = MemoryNotificationSink::new();
        let id = sink.notify(&notification()).await.unwrap();

        assert_eq!(sink.delivered_count(), 1);
        assert_eq!(sink.live_count(), 1);
        assert_eq!(sink.count_for(&SignalId::new("5")), 1);

        sink.dismiss(&id).await.unwrap();
        assert_eq!(sink.live_count(), 0);
        assert_eq!(sink.dismissed(), vec![id.clone()]);

        // Dismissing twice is harmless
        sink.dismiss(&id).await.unwrap();
        assert_eq!(sink.dismissed().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_sink() {
        let sink = MemoryNotificationSink::new();
        sink.set_failing(true);

        let result = sink.notify(&notification()).await;
        assert!(matches!(result, Err(GeoradarError::NotificationDispatch { .. })));
        assert_eq!(sink.delivered_count(), 0);

        sink.set_failing(false);
        assert!(sink.notify(&notification()).await.is_ok());
    }

    #[tokio::test]
    async fn test_configure_channel_replaces_by_id() {
        let sink = MemoryNotificationSink::new();
        sink.configure_channel(&NotificationChannel::signals()).await.unwrap();
        sink.configure_channel(&NotificationChannel::signals()).await.unwrap();
        assert_eq!(sink.channels().len(), 1);
    }
}
