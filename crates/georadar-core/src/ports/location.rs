use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{LocationFix, PermissionStatus, UpdateOptions};

/// Callback the platform invokes for every delivered fix
pub type FixCallback = Arc<dyn Fn(LocationFix) + Send + Sync + 'static>;

/// Opaque handle for an active update stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UpdateHandle(pub u64);

/// Port for the platform location service
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Whether device location services are switched on
    async fn services_enabled(&self) -> Result<bool>;

    /// Current access level, without prompting
    async fn permission_status(&self) -> Result<PermissionStatus>;

    /// Prompt for while-in-use access
    async fn request_foreground_permission(&self) -> Result<PermissionStatus>;

    /// Prompt for continuous access
    async fn request_background_permission(&self) -> Result<PermissionStatus>;

    /// Begin delivering fixes to `on_fix`
    async fn start_updates(&self, options: UpdateOptions, on_fix: FixCallback)
        -> Result<UpdateHandle>;

    /// Stop a stream started by `start_updates`
    async fn stop_updates(&self, handle: UpdateHandle) -> Result<()>;
}
