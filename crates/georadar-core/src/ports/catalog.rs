use async_trait::async_trait;

use crate::error::Result;
use crate::models::Signal;

/// Port for the source of geofenced signals
#[async_trait]
pub trait SignalCatalog: Send + Sync {
    /// Current set of signals. Called once per polling tick.
    async fn list_signals(&self) -> Result<Vec<Signal>>;
}
