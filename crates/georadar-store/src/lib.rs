//! GeoRadar Store - Port adapters
//!
//! Implementations of the catalog, notification and location ports for
//! development, testing, and the command-line host.

pub mod catalog;
pub mod fixtures;
pub mod location;
pub mod memory;

pub use catalog::{decode_signals, HttpSignalCatalog, JsonFileCatalog, StaticSignalCatalog};
pub use location::SimulatedLocationProvider;
pub use memory::MemoryNotificationSink;
