//! Canonical coordinate type.
//!
//! Coordinates reach the system in two naming conventions: platform fixes use
//! `{latitude, longitude}` while signal catalogs use `{lat, long}`. Both are
//! accepted on input and folded into [`Coordinate`]; output always uses the
//! short form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair in decimal degrees (WGS 84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "CoordinateRepr")]
pub struct Coordinate {
    pub lat: f64,
    pub long: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.long.is_finite()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.long)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, long): (f64, f64)) -> Self {
        Self::new(lat, long)
    }
}

/// Accepted input shapes
#[derive(Deserialize)]
#[serde(untagged)]
enum CoordinateRepr {
    Verbose {
        latitude: f64,
        longitude: f64,
    },
    Short {
        lat: f64,
        #[serde(alias = "lng", alias = "lon")]
        long: f64,
    },
}

impl From<CoordinateRepr> for Coordinate {
    fn from(repr: CoordinateRepr) -> Self {
        match repr {
            CoordinateRepr::Verbose { latitude, longitude } => Self::new(latitude, longitude),
            CoordinateRepr::Short { lat, long } => Self::new(lat, long),
        }
    }
}
