use geo::{Distance, HaversineMeasure, Point};
use georadar_core::models::Coordinate;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometers, rounded to
/// 3 decimal places (meter precision).
///
/// Non-finite inputs yield NaN; callers validate coordinates first.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let sphere = HaversineMeasure::new(EARTH_RADIUS_KM * 1000.0);
    let meters = sphere.distance(Point::new(a.long, a.lat), Point::new(b.long, b.lat));
    round_to_meters(meters / 1000.0)
}

/// Inclusive range check: `distance_km(a, b) <= radius_km`
pub fn is_within_range(a: Coordinate, b: Coordinate, radius_km: f64) -> bool {
    distance_km(a, b) <= radius_km
}

fn round_to_meters(km: f64) -> f64 {
    (km * 1000.0).round() / 1000.0
}
