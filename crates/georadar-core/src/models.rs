pub mod coordinate;
pub mod eligibility;
pub mod location;
pub mod notification;
pub mod signal;

pub use coordinate::Coordinate;
pub use eligibility::{EligibilityResult, TemporalOffset};
pub use location::{LocationFix, PermissionResult, PermissionStatus, UpdateOptions};
pub use notification::{
    Importance, NotificationChannel, NotificationId, NotificationPayload, SignalNotification,
};
pub use signal::{Signal, SignalId, SignalKind};
