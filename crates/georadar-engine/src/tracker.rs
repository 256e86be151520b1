//! Location tracking on top of a [`LocationProvider`]

use chrono::{DateTime, Utc};
use georadar_core::error::{GeoradarError, Result};
use georadar_core::models::{LocationFix, PermissionResult, PermissionStatus, UpdateOptions};
use georadar_core::ports::{FixCallback, LocationProvider, UpdateHandle};
use georadar_core::Clock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Minimum gap between two "location updated" log lines
pub const LOCATION_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Callback invoked with every new fix
pub type LocationCallback = Arc<dyn Fn(&LocationFix) + Send + Sync + 'static>;

/// Single source of truth for the device position.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct LocationTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    provider: Arc<dyn LocationProvider>,
    clock: Arc<dyn Clock>,
    options: UpdateOptions,
    current: watch::Sender<Option<LocationFix>>,
    subscribers: Mutex<Vec<(u64, LocationCallback)>>,
    next_subscriber: AtomicU64,
    stream: tokio::sync::Mutex<Option<UpdateHandle>>,
    last_logged: Mutex<Option<DateTime<Utc>>>,
}

impl LocationTracker {
    pub fn new(provider: Arc<dyn LocationProvider>, clock: Arc<dyn Clock>) -> Self {
        Self::with_options(provider, clock, UpdateOptions::default())
    }

    pub fn with_options(
        provider: Arc<dyn LocationProvider>,
        clock: Arc<dyn Clock>,
        options: UpdateOptions,
    ) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            inner: Arc::new(TrackerInner {
                provider,
                clock,
                options,
                current,
                subscribers: Mutex::new(Vec::new()),
                next_subscriber: AtomicU64::new(0),
                stream: tokio::sync::Mutex::new(None),
                last_logged: Mutex::new(None),
            }),
        }
    }

    /// Whether continuous ("Always") access is already granted.
    ///
    /// Provider errors count as not granted.
    pub async fn check_permissions(&self) -> bool {
        match self.inner.provider.permission_status().await {
            Ok(status) => status == PermissionStatus::Background,
            Err(e) => {
                warn!(error = %e, "Failed to read location permission status");
                false
            }
        }
    }

    /// Walk the user through foreground then background access
    pub async fn request_permissions(&self) -> PermissionResult {
        match self.request_permissions_inner().await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Location permission request failed");
                PermissionResult::refused(
                    PermissionStatus::None,
                    "An error occurred while requesting location permissions.",
                )
            }
        }
    }

    async fn request_permissions_inner(&self) -> Result<PermissionResult> {
        let provider = &self.inner.provider;

        if !provider.services_enabled().await? {
            return Ok(PermissionResult::refused(
                PermissionStatus::None,
                "Location services are disabled. Please enable them in your device settings.",
            ));
        }

        let foreground = provider.request_foreground_permission().await?;
        if !matches!(foreground, PermissionStatus::Foreground | PermissionStatus::Background) {
            return Ok(PermissionResult::refused(
                PermissionStatus::Denied,
                "GeoRadar needs location access to find signals near you.",
            ));
        }

        let background = provider.request_background_permission().await?;
        if background != PermissionStatus::Background {
            return Ok(PermissionResult::refused(
                PermissionStatus::Foreground,
                "GeoRadar needs 'Always' location access to alert you about nearby signals \
                 while the app is in the background.",
            ));
        }

        Ok(PermissionResult::granted())
    }

    /// Begin receiving fixes from the provider. No-op while already tracking.
    pub async fn start_tracking(&self) -> Result<()> {
        let mut stream = self.inner.stream.lock().await;
        if stream.is_some() {
            debug!("Location tracking already active");
            return Ok(());
        }

        if !self.check_permissions().await {
            let result = self.request_permissions().await;
            if !result.granted {
                return Err(GeoradarError::PermissionDenied {
                    message: result
                        .message
                        .unwrap_or_else(|| "Location permission denied".to_string()),
                    should_open_settings: result.should_open_settings,
                });
            }
        }

        let weak = Arc::downgrade(&self.inner);
        let on_fix: FixCallback = Arc::new(move |fix| {
            if let Some(inner) = weak.upgrade() {
                inner.update_location(fix);
            }
        });

        let handle = self
            .inner
            .provider
            .start_updates(self.inner.options, on_fix)
            .await
            .map_err(|e| match e {
                start @ GeoradarError::ProviderStart { .. } => start,
                other => GeoradarError::ProviderStart { reason: other.to_string() },
            })?;

        *stream = Some(handle);
        info!(
            interval_ms = self.inner.options.interval.as_millis() as u64,
            min_distance_m = self.inner.options.min_distance_m,
            "Location tracking started"
        );
        Ok(())
    }

    /// Stop the provider stream and forget the current fix. Idempotent.
    pub async fn stop_tracking(&self) {
        let handle = self.inner.stream.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = self.inner.provider.stop_updates(handle).await {
                warn!(error = %e, "Failed to stop location updates");
            }
            info!("Location tracking stopped");
        }
        self.inner.current.send_replace(None);
    }

    pub async fn is_tracking(&self) -> bool {
        self.inner.stream.lock().await.is_some()
    }

    /// Record a new fix and notify subscribers in subscription order
    pub fn update_location(&self, fix: LocationFix) {
        self.inner.update_location(fix);
    }

    /// Snapshot of the latest fix
    pub fn current_location(&self) -> Option<LocationFix> {
        *self.inner.current.borrow()
    }

    /// Register `callback` for future fixes.
    ///
    /// The current fix, if any, is delivered immediately. Dropping the returned
    /// [`Subscription`] unsubscribes.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&LocationFix) + Send + Sync + 'static,
    {
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let callback: LocationCallback = Arc::new(callback);
        self.inner.subscribers().push((id, callback.clone()));

        if let Some(fix) = self.current_location() {
            callback(&fix);
        }

        Subscription { id, tracker: Arc::downgrade(&self.inner) }
    }

    /// Resolve with the current fix, or the next one to arrive within `timeout`
    pub async fn wait_for_first_fix(&self, timeout: Duration) -> Result<LocationFix> {
        let mut rx = self.inner.current.subscribe();
        let waited = tokio::time::timeout(timeout, rx.wait_for(Option::is_some)).await;

        match waited {
            Ok(Ok(current)) => (*current).ok_or(GeoradarError::LocationLost),
            Ok(Err(_)) => Err(GeoradarError::LocationLost),
            Err(_) => {
                Err(GeoradarError::LocationTimeout { timeout_ms: timeout.as_millis() as u64 })
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers().len()
    }
}

impl TrackerInner {
    fn subscribers(&self) -> MutexGuard<'_, Vec<(u64, LocationCallback)>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_location(&self, fix: LocationFix) {
        self.current.send_replace(Some(fix));
        self.log_fix(&fix);

        let callbacks: Vec<LocationCallback> =
            self.subscribers().iter().map(|(_, callback)| callback.clone()).collect();
        for callback in callbacks {
            callback(&fix);
        }
    }

    fn log_fix(&self, fix: &LocationFix) {
        let now = self.clock.now();
        let mut last_logged = self.last_logged.lock().unwrap_or_else(PoisonError::into_inner);

        let due = match *last_logged {
            Some(at) => (now - at).num_milliseconds() >= LOCATION_LOG_INTERVAL.as_millis() as i64,
            None => true,
        };
        if due {
            *last_logged = Some(now);
            info!(
                lat = fix.coordinate.lat,
                long = fix.coordinate.long,
                accuracy_m = fix.accuracy_m,
                "Location updated"
            );
        }
    }
}

/// Handle returned by [`LocationTracker::subscribe`]
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    tracker: Weak<TrackerInner>,
}

impl Subscription {
    pub fn unsubscribe(self) {}

    fn detach(&self) {
        if let Some(inner) = self.tracker.upgrade() {
            inner.subscribers().retain(|(id, _)| *id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}
