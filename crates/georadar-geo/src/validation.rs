use georadar_core::models::Coordinate;
use serde::Serialize;

/// Validation result with details
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with the offending field
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    pub fn add_error(&mut self, field: &'static str, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { field, reason });
    }

    /// All reasons joined into one line
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.reason))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Check that a coordinate is finite and inside WGS 84 bounds
pub fn validate_coordinate(coordinate: &Coordinate) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if !coordinate.lat.is_finite() {
        result.add_error("lat", "must be finite".to_string());
    } else if !(-90.0..=90.0).contains(&coordinate.lat) {
        result.add_error("lat", format!("{} is outside [-90, 90]", coordinate.lat));
    }

    if !coordinate.long.is_finite() {
        result.add_error("long", "must be finite".to_string());
    } else if !(-180.0..=180.0).contains(&coordinate.long) {
        result.add_error("long", format!("{} is outside [-180, 180]", coordinate.long));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        assert!(validate_coordinate(&Coordinate::new(24.81511, 46.7086)).is_valid);
        assert!(validate_coordinate(&Coordinate::new(-90.0, 180.0)).is_valid);
        // 0,0 is a real place
        assert!(validate_coordinate(&Coordinate::new(0.0, 0.0)).is_valid);
    }

    #[test]
    fn test_out_of_range_latitude() {
        let result = validate_coordinate(&Coordinate::new(91.0, 0.0));
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "lat");
    }

    #[test]
    fn test_non_finite_both_fields() {
        let result = validate_coordinate(&Coordinate::new(f64::NAN, f64::INFINITY));
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.summary(), "lat: must be finite; long: must be finite");
    }
}
