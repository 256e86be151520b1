//! GeoRadar Engine - Location tracking and signal polling
//!
//! This crate implements the alerting use cases: it keeps the latest location fix,
//! evaluates the signal catalog against it on a fixed cadence, and raises
//! deduplicated proximity notifications.

pub mod cooldown;
pub mod dispatcher;
pub mod engine;
pub mod policy;
pub mod report;
pub mod tracker;

pub use cooldown::CooldownTable;
pub use dispatcher::NotificationDispatcher;
pub use engine::{PollingState, SignalPollingEngine};
pub use policy::{GeofenceEligibilityPolicy, NotifyReason, NotifyRule, SuppressReason};
pub use report::{OutcomeStatus, SignalOutcome, TickReport};
pub use tracker::{LocationCallback, LocationTracker, Subscription};
