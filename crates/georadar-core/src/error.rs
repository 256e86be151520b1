//! Error types for GeoRadar

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoradarError {
    // Location errors
    #[error("Location permission denied: {message}")]
    PermissionDenied {
        message: String,
        should_open_settings: bool,
    },

    #[error("No location fix received within {timeout_ms}ms")]
    LocationTimeout { timeout_ms: u64 },

    #[error("Location lost while polling")]
    LocationLost,

    #[error("Failed to start location updates: {reason}")]
    ProviderStart { reason: String },

    // Polling errors
    #[error("Polling start was cancelled by a stop request")]
    StartCancelled,

    // Catalog errors
    #[error("Failed to fetch signal catalog: {reason}")]
    CatalogFetch { reason: String },

    #[error("Malformed signal {signal_id}: {reason}")]
    MalformedSignal { signal_id: String, reason: String },

    // Notification errors
    #[error("Notification dispatch failed: {reason}")]
    NotificationDispatch { reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GeoradarError {
    /// Plain-language status text suitable for end users.
    pub fn user_message(&self) -> String {
        match self {
            GeoradarError::PermissionDenied { message, .. } => message.clone(),
            GeoradarError::LocationTimeout { .. } => {
                "We couldn't determine your location. Check that GPS is on and try again."
                    .to_string()
            }
            GeoradarError::LocationLost => {
                "Location tracking stopped, so alerts are paused.".to_string()
            }
            GeoradarError::ProviderStart { .. } => {
                "Failed to start location tracking. Please try again.".to_string()
            }
            GeoradarError::StartCancelled => "Monitoring was stopped.".to_string(),
            GeoradarError::CatalogFetch { .. } => {
                "Nearby alerts are temporarily unavailable.".to_string()
            }
            GeoradarError::MalformedSignal { .. } | GeoradarError::Serialization(_) => {
                "Some alerts could not be read.".to_string()
            }
            GeoradarError::NotificationDispatch { .. } => {
                "An alert could not be shown. It will be retried.".to_string()
            }
            GeoradarError::ConfigMissing { .. }
            | GeoradarError::ConfigInvalid { .. }
            | GeoradarError::Io(_) => "Failed to start event monitoring.".to_string(),
        }
    }

    /// Failures that the polling loop retries on its next tick.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GeoradarError::CatalogFetch { .. } | GeoradarError::NotificationDispatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GeoradarError>;
