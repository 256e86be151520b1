//! Injectable wall clock

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, RwLock};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same instant. Uses `RwLock::unwrap()` like the in-memory
/// adapters: a poisoned lock means a test already panicked.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Arc::new(RwLock::new(start)) }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.write().unwrap() = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_is_shared_between_clones() {
        let start = Utc.with_ymd_and_hms(2026, 10, 14, 8, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let observer = clock.clone();

        clock.advance(Duration::seconds(15));
        assert_eq!(observer.now(), start + Duration::seconds(15));

        clock.set(start);
        assert_eq!(observer.now(), start);
    }
}
