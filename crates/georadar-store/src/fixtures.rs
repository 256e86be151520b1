//! Built-in demo catalog.
//!
//! Six signals across three regions, with temporal bounds relative to the
//! moment the fixture is built. Handy test positions:
//! Riyadh 24.80895, 46.70663; Dubai 25.0192, 55.2011; London 51.56327, -0.28784.

use chrono::{DateTime, Duration, Utc};
use georadar_core::models::{Coordinate, Signal};

pub const RIYADH_TESTER: Coordinate = Coordinate::new(24.80895, 46.70663);
pub const DUBAI_TESTER: Coordinate = Coordinate::new(25.0192, 55.2011);
pub const LONDON_TESTER: Coordinate = Coordinate::new(51.56327, -0.28784);

/// Demo signals anchored at `now`
pub fn demo_signals(now: DateTime<Utc>) -> Vec<Signal> {
    vec![
        // Riyadh
        Signal::event(
            "1",
            "Granada Mall Event",
            Coordinate::new(24.81511, 46.7086),
            now + Duration::hours(1),
            "Event ending at Granada Mall soon",
        ),
        Signal::station_closure(
            "2",
            "KKIA Terminal 5 Closure",
            Coordinate::new(24.95911, 46.7066),
            now - Duration::minutes(5),
            "Closure at KKIA Terminal 5",
        ),
        // London
        Signal::event(
            "3",
            "Wembley Stadium Event",
            Coordinate::new(51.556, -0.2795),
            now + Duration::minutes(10),
            "Event ending at Wembley Stadium soon",
        ),
        Signal::station_closure(
            "4",
            "Wembley Central Closure",
            Coordinate::new(51.532, -0.124),
            now - Duration::minutes(30),
            "Closure at Wembley Central Station",
        ),
        // Dubai
        Signal::event(
            "5",
            "Lulu Hypermarket Event",
            Coordinate::new(25.0283, 55.2095),
            now + Duration::hours(1),
            "Special event ending at Lulu Hypermarket",
        ),
        Signal::station_closure(
            "6",
            "Al Qiyadah Metro Closure",
            Coordinate::new(25.0225, 55.2021),
            now - Duration::minutes(2),
            "Temporary closure at Al Qiyadah Metro Station",
        ),
    ]
}
