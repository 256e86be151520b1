//! Per-pass evaluation results

use chrono::{DateTime, Utc};
use georadar_core::models::{EligibilityResult, LocationFix, SignalId};
use serde::Serialize;

use crate::policy::{NotifyReason, SuppressReason};

/// What happened to one signal during a pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Notified { reason: NotifyReason },
    Suppressed { reason: SuppressReason },
    /// The signal could not be evaluated
    Skipped { reason: String },
    /// Eligible, but the sink rejected the notification
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalOutcome {
    pub signal_id: SignalId,
    pub name: String,
    pub kind: &'static str,

    /// Absent when the signal was skipped before evaluation
    pub eligibility: Option<EligibilityResult>,

    #[serde(flatten)]
    pub status: OutcomeStatus,
}

/// Result of one evaluation pass over the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub at: DateTime<Utc>,
    pub is_initial: bool,
    pub location: LocationFix,
    pub outcomes: Vec<SignalOutcome>,
}

impl TickReport {
    pub fn new(at: DateTime<Utc>, is_initial: bool, location: LocationFix) -> Self {
        Self { at, is_initial, location, outcomes: Vec::new() }
    }

    pub fn evaluated(&self) -> usize {
        self.outcomes.iter().filter(|o| o.eligibility.is_some()).count()
    }

    pub fn notified(&self) -> impl Iterator<Item = &SignalOutcome> {
        self.outcomes.iter().filter(|o| matches!(o.status, OutcomeStatus::Notified { .. }))
    }

    pub fn notified_ids(&self) -> Vec<&SignalId> {
        self.notified().map(|o| &o.signal_id).collect()
    }

    pub fn suppressed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Suppressed { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o.status, OutcomeStatus::Skipped { .. })).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o.status, OutcomeStatus::Failed { .. })).count()
    }

    pub fn outcome(&self, id: &SignalId) -> Option<&SignalOutcome> {
        self.outcomes.iter().find(|o| &o.signal_id == id)
    }
}
