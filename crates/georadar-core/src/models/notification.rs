use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Coordinate, Signal, SignalId, SignalKind};

/// Identifier assigned by the notification sink to a delivered notification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub String);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Data attached to a notification, handed back to the host when tapped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub message: String,
    pub distance: String,
    pub coordinates: Coordinate,
}

/// A proximity notification ready for delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalNotification {
    pub signal_id: SignalId,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub channel_id: String,
    pub payload: NotificationPayload,
}

impl SignalNotification {
    pub fn for_signal(signal: &Signal, distance_km: f64, channel_id: impl Into<String>) -> Self {
        let title = match signal.kind {
            SignalKind::Event { .. } => "Event Ending Soon!",
            SignalKind::StationClosure { .. } => "Station Closure Alert!",
        };
        let distance = format!("{:.1}km away", distance_km);

        Self {
            signal_id: signal.id.clone(),
            title: title.to_string(),
            subtitle: distance.clone(),
            body: signal.message.clone(),
            channel_id: channel_id.into(),
            payload: NotificationPayload {
                kind: signal.kind.label().to_string(),
                name: signal.name.clone(),
                message: signal.message.clone(),
                distance,
                coordinates: signal.coordinates,
            },
        }
    }
}

/// Delivery priority of a notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Default,
    #[default]
    High,
    Max,
}

/// Platform channel settings (sound, vibration, priority)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub importance: Importance,
    pub sound: bool,

    /// Alternating off/on durations in milliseconds
    pub vibration_pattern: Vec<u64>,
}

impl NotificationChannel {
    pub const SIGNALS: &'static str = "signals";

    /// Channel used for proximity alerts
    pub fn signals() -> Self {
        Self {
            id: Self::SIGNALS.to_string(),
            name: "Nearby signals".to_string(),
            importance: Importance::High,
            sound: true,
            vibration_pattern: vec![0, 500, 200, 500],
        }
    }
}
