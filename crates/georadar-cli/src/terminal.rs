//! Notification sink that prints to the terminal

use async_trait::async_trait;
use console::style;
use georadar_core::error::Result;
use georadar_core::models::{NotificationChannel, NotificationId, SignalNotification};
use georadar_core::ports::NotificationSink;
use serde_json::json;
use tracing::debug;

pub struct TerminalNotificationSink {
    json: bool,
}

impl TerminalNotificationSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

#[async_trait]
impl NotificationSink for TerminalNotificationSink {
    async fn notify(&self, notification: &SignalNotification) -> Result<NotificationId> {
        let id = NotificationId(uuid::Uuid::new_v4().to_string());

        if self.json {
            let line = json!({
                "event": "notification",
                "id": id,
                "at": chrono::Utc::now(),
                "notification": notification,
            });
            println!("{}", line);
        } else {
            println!(
                "{} {} {}\n  {}",
                style("🔔").bold(),
                style(&notification.title).yellow().bold(),
                style(format!("({})", notification.subtitle)).dim(),
                notification.body
            );
        }

        Ok(id)
    }

    async fn dismiss(&self, id: &NotificationId) -> Result<()> {
        debug!(notification_id = %id, "Notification dismissed");
        Ok(())
    }

    async fn configure_channel(&self, channel: &NotificationChannel) -> Result<()> {
        debug!(channel = %channel.id, importance = ?channel.importance, "Notification channel ready");
        Ok(())
    }
}
