//! Eligibility and notification rules

use chrono::{DateTime, Utc};
use georadar_core::config::EngineConfig;
use georadar_core::models::{Coordinate, EligibilityResult, Signal, SignalKind, TemporalOffset};
use georadar_geo::distance_km;
use serde::Serialize;
use std::time::Duration;

/// Tolerance applied to elapsed-time comparisons so a timer firing a few
/// milliseconds early still counts as a full interval.
pub const SCHEDULER_SLACK_MS: i64 = 250;

/// Range and temporal window rules for a single signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeofenceEligibilityPolicy {
    range_threshold_km: f64,
    temporal_window_minutes: f64,
}

impl GeofenceEligibilityPolicy {
    pub fn new(range_threshold_km: f64, temporal_window_minutes: u32) -> Self {
        Self { range_threshold_km, temporal_window_minutes: f64::from(temporal_window_minutes) }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.range_threshold_km, config.temporal_window_minutes)
    }

    pub fn range_threshold_km(&self) -> f64 {
        self.range_threshold_km
    }

    /// Minutes until an event ends, or since a closure started.
    pub fn temporal_offset(&self, kind: &SignalKind, now: DateTime<Utc>) -> TemporalOffset {
        match kind {
            SignalKind::Event { end_time } => {
                TemporalOffset::MinutesRemaining(minutes_between(now, *end_time))
            }
            SignalKind::StationClosure { start_time } => {
                TemporalOffset::MinutesElapsed(minutes_between(*start_time, now))
            }
        }
    }

    /// The window is half-open: `(0, window]`.
    pub fn within_window(&self, offset: TemporalOffset) -> bool {
        let minutes = offset.minutes();
        minutes > 0.0 && minutes <= self.temporal_window_minutes
    }

    pub fn evaluate(
        &self,
        signal: &Signal,
        position: Coordinate,
        now: DateTime<Utc>,
    ) -> EligibilityResult {
        let distance_km = distance_km(position, signal.coordinates);
        let offset = self.temporal_offset(&signal.kind, now);

        EligibilityResult {
            distance_km,
            in_range: distance_km <= self.range_threshold_km,
            within_temporal_window: self.within_window(offset),
            offset,
        }
    }
}

fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}

/// Why a signal was notified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyReason {
    /// First pass after polling started
    InitialPass,
    /// No earlier notification on record
    FirstSighting,
    /// The cooldown interval has passed
    CooldownElapsed,
    /// Inside the temporal window, where cooldown is bypassed
    Imminent,
}

/// Why a signal was not notified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    OutOfRange,
    /// Event already ended, or closure not started yet
    NotLive,
    CoolingDown,
    /// Polling stopped while the pass was running
    Stopped,
}

/// Dedup rule deciding whether an eligible signal is notified again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyRule {
    cooldown_ms: i64,
    reminder_ms: i64,
}

impl NotifyRule {
    pub fn new(cooldown: Duration, reminder: Duration) -> Self {
        Self { cooldown_ms: duration_ms(cooldown), reminder_ms: duration_ms(reminder) }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.cooldown_interval, config.reminder_interval)
    }

    /// `elapsed_ms` is the time since the last successful notification.
    pub fn decide(
        &self,
        result: &EligibilityResult,
        elapsed_ms: Option<i64>,
        is_initial: bool,
    ) -> Result<NotifyReason, SuppressReason> {
        if !result.in_range {
            return Err(SuppressReason::OutOfRange);
        }
        if !result.is_live() {
            return Err(SuppressReason::NotLive);
        }
        if is_initial {
            return Ok(NotifyReason::InitialPass);
        }

        let Some(elapsed_ms) = elapsed_ms else {
            return Ok(NotifyReason::FirstSighting);
        };
        let elapsed_ms = elapsed_ms + SCHEDULER_SLACK_MS;

        if elapsed_ms >= self.cooldown_ms {
            Ok(NotifyReason::CooldownElapsed)
        } else if result.is_eligible() && elapsed_ms >= self.reminder_ms {
            Ok(NotifyReason::Imminent)
        } else {
            Err(SuppressReason::CoolingDown)
        }
    }
}

fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
