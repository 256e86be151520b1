//! Per-signal notification timestamps

use chrono::{DateTime, Utc};
use georadar_core::models::SignalId;
use std::collections::HashMap;

/// Last successful notification time for each signal.
///
/// Entries are only written after a notification was delivered, so a failed
/// dispatch leaves the signal eligible on the next pass.
#[derive(Debug, Clone, Default)]
pub struct CooldownTable {
    last_notified: HashMap<SignalId, DateTime<Utc>>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: SignalId, at: DateTime<Utc>) {
        self.last_notified.insert(id, at);
    }

    pub fn last_notified(&self, id: &SignalId) -> Option<DateTime<Utc>> {
        self.last_notified.get(id).copied()
    }

    /// Milliseconds since the last notification, if there was one.
    ///
    /// A clock that moved backwards yields zero.
    pub fn elapsed_ms(&self, id: &SignalId, now: DateTime<Utc>) -> Option<i64> {
        self.last_notified(id).map(|at| (now - at).num_milliseconds().max(0))
    }

    pub fn clear(&mut self) {
        self.last_notified.clear();
    }

    pub fn len(&self) -> usize {
        self.last_notified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_notified.is_empty()
    }

    pub fn snapshot(&self) -> HashMap<SignalId, DateTime<Utc>> {
        self.last_notified.clone()
    }
}
