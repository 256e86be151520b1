//! GeoRadar Core - Domain models, ports, and configuration
//!
//! This crate contains the domain types and port definitions shared by the
//! geofence polling engine and its adapters.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{GeoradarError, Result};
