use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Coordinate;

/// A single location reading reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub coordinate: Coordinate,

    /// When the platform captured the reading
    pub captured_at: DateTime<Utc>,

    /// Horizontal accuracy in meters
    #[serde(default)]
    pub accuracy_m: Option<f64>,

    /// Heading in degrees from true north
    #[serde(default)]
    pub heading_deg: Option<f64>,

    /// Ground speed in meters per second
    #[serde(default)]
    pub speed_mps: Option<f64>,
}

impl LocationFix {
    pub fn new(coordinate: Coordinate, captured_at: DateTime<Utc>) -> Self {
        Self { coordinate, captured_at, accuracy_m: None, heading_deg: None, speed_mps: None }
    }

    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }
}

/// Granted location access level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// Not determined, or location services are off
    #[default]
    None,
    /// While-in-use access only
    Foreground,
    /// Continuous ("Always") access
    Background,
    Denied,
}

/// Outcome of a permission request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResult {
    pub granted: bool,

    /// The host should route the user to the OS settings screen
    pub should_open_settings: bool,

    pub status: PermissionStatus,

    #[serde(default)]
    pub message: Option<String>,
}

impl PermissionResult {
    pub fn granted() -> Self {
        Self {
            granted: true,
            should_open_settings: false,
            status: PermissionStatus::Background,
            message: None,
        }
    }

    pub fn refused(status: PermissionStatus, message: impl Into<String>) -> Self {
        Self { granted: false, should_open_settings: true, status, message: Some(message.into()) }
    }
}

/// Delivery cadence requested from the platform provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Minimum time between fixes
    pub interval: Duration,

    /// Minimum movement between fixes, in meters
    pub min_distance_m: u32,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self { interval: Duration::from_secs(15), min_distance_m: 10 }
    }
}
