use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Coordinate;

/// Stable identifier for a signal
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalId(pub String);

impl SignalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SignalId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Kind of signal, carrying its temporal bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalKind {
    /// Relevant until it ends
    Event {
        #[serde(rename = "endTime")]
        end_time: DateTime<Utc>,
    },
    /// Relevant once it has started
    StationClosure {
        #[serde(rename = "startTime")]
        start_time: DateTime<Utc>,
    },
}

impl SignalKind {
    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::Event { .. } => "event",
            SignalKind::StationClosure { .. } => "station_closure",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A geofenced point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,

    /// Human-readable name
    pub name: String,

    #[serde(flatten)]
    pub kind: SignalKind,

    pub coordinates: Coordinate,

    /// Body text shown in the notification
    pub message: String,
}

impl Signal {
    pub fn event(
        id: impl Into<String>,
        name: impl Into<String>,
        coordinates: Coordinate,
        end_time: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: SignalId::new(id),
            name: name.into(),
            kind: SignalKind::Event { end_time },
            coordinates,
            message: message.into(),
        }
    }

    pub fn station_closure(
        id: impl Into<String>,
        name: impl Into<String>,
        coordinates: Coordinate,
        start_time: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: SignalId::new(id),
            name: name.into(),
            kind: SignalKind::StationClosure { start_time },
            coordinates,
            message: message.into(),
        }
    }
}
