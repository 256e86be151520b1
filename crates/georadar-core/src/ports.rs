//! Port trait definitions
//!
//! These traits define the external collaborators the engine depends on.
//! Adapters live in `georadar-store`; platform integrations implement them
//! in the host application.

pub mod catalog;
pub mod location;
pub mod notification;

pub use catalog::SignalCatalog;
pub use location::{FixCallback, LocationProvider, UpdateHandle};
pub use notification::NotificationSink;
