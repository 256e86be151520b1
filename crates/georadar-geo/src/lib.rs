//! GeoRadar Geo - Distance and coordinate checks
//!
//! Great-circle distance on a spherical Earth and validation of the
//! coordinates signals are matched against.

pub mod distance;
pub mod validation;

pub use distance::{distance_km, is_within_range, EARTH_RADIUS_KM};
pub use validation::{validate_coordinate, ValidationError, ValidationResult};
