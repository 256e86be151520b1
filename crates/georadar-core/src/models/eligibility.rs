use serde::{Deserialize, Serialize};

/// Signed distance in minutes between now and a signal's temporal bound.
///
/// Events look forward to their end, closures look back to their start.
/// Positive values mean the signal is live.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalOffset {
    MinutesRemaining(f64),
    MinutesElapsed(f64),
}

impl TemporalOffset {
    pub fn minutes(&self) -> f64 {
        match self {
            TemporalOffset::MinutesRemaining(m) | TemporalOffset::MinutesElapsed(m) => *m,
        }
    }
}

/// Outcome of evaluating one signal against one location fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    /// Great-circle distance, rounded to 3 decimals
    pub distance_km: f64,

    /// `distance_km <= range threshold`
    pub in_range: bool,

    /// Whether the offset falls inside `(0, window]`
    pub within_temporal_window: bool,

    pub offset: TemporalOffset,
}

impl EligibilityResult {
    /// Ended events and closures that have not started yet are not live.
    pub fn is_live(&self) -> bool {
        self.offset.minutes() > 0.0
    }

    /// In range and inside the temporal window.
    pub fn is_eligible(&self) -> bool {
        self.in_range && self.within_temporal_window
    }
}
