//! Simulated platform location provider.
//!
//! Stands in for the device GPS: permission state is scripted, fixes are
//! either pushed by hand or replayed from a route on the requested interval.
//! Uses `Mutex::unwrap()` like the other in-memory adapters.

use async_trait::async_trait;
use georadar_core::clock::{Clock, SystemClock};
use georadar_core::error::{GeoradarError, Result};
use georadar_core::models::{Coordinate, LocationFix, PermissionStatus, UpdateOptions};
use georadar_core::ports::{FixCallback, LocationProvider, UpdateHandle};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct PermissionScript {
    services_enabled: bool,
    status: PermissionStatus,
    foreground_outcome: PermissionStatus,
    background_outcome: PermissionStatus,
}

struct ActiveStream {
    callback: FixCallback,
    replay: Option<tokio::task::JoinHandle<()>>,
}

/// Scriptable [`LocationProvider`]
pub struct SimulatedLocationProvider {
    permissions: Mutex<PermissionScript>,
    route: Vec<Coordinate>,
    start_failure: Option<String>,
    clock: Arc<dyn Clock>,
    streams: Mutex<HashMap<UpdateHandle, ActiveStream>>,
    next_handle: AtomicU64,
}

impl Default for SimulatedLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedLocationProvider {
    /// Provider with continuous access already granted and no route
    pub fn new() -> Self {
        Self {
            permissions: Mutex::new(PermissionScript {
                services_enabled: true,
                status: PermissionStatus::Background,
                foreground_outcome: PermissionStatus::Foreground,
                background_outcome: PermissionStatus::Background,
            }),
            route: Vec::new(),
            start_failure: None,
            clock: Arc::new(SystemClock),
            streams: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Provider that reports a fixed position on every update
    pub fn stationary(at: Coordinate) -> Self {
        Self::new().with_route(vec![at])
    }

    /// Replay these coordinates in order, holding the last one
    pub fn with_route(mut self, route: Vec<Coordinate>) -> Self {
        self.route = route;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current permission state and what each prompt will grant
    pub fn with_permissions(
        self,
        status: PermissionStatus,
        foreground_outcome: PermissionStatus,
        background_outcome: PermissionStatus,
    ) -> Self {
        {
            let mut script = self.permissions.lock().unwrap();
            script.status = status;
            script.foreground_outcome = foreground_outcome;
            script.background_outcome = background_outcome;
        }
        self
    }

    pub fn with_services_disabled(self) -> Self {
        self.permissions.lock().unwrap().services_enabled = false;
        self
    }

    /// Make `start_updates` fail with this reason
    pub fn with_start_failure(mut self, reason: impl Into<String>) -> Self {
        self.start_failure = Some(reason.into());
        self
    }

    /// Deliver a fix to every active stream
    pub fn push_fix(&self, fix: LocationFix) {
        let callbacks: Vec<FixCallback> =
            self.streams.lock().unwrap().values().map(|s| Arc::clone(&s.callback)).collect();
        for callback in callbacks {
            callback(fix);
        }
    }

    /// Deliver a fix at `coordinate`, stamped with the provider clock
    pub fn push_coordinate(&self, coordinate: Coordinate) {
        self.push_fix(LocationFix::new(coordinate, self.clock.now()));
    }

    pub fn active_streams(&self) -> usize {
        self.streams.lock().unwrap().len()
    }

    fn spawn_replay(&self, options: UpdateOptions, callback: FixCallback) -> tokio::task::JoinHandle<()> {
        let route = self.route.clone();
        let clock = Arc::clone(&self.clock);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(options.interval);
            let mut index = 0;
            loop {
                ticker.tick().await;
                let coordinate = route[index.min(route.len() - 1)];
                callback(LocationFix::new(coordinate, clock.now()).with_accuracy(5.0));
                index += 1;
            }
        })
    }
}

#[async_trait]
impl LocationProvider for SimulatedLocationProvider {
    async fn services_enabled(&self) -> Result<bool> {
        Ok(self.permissions.lock().unwrap().services_enabled)
    }

    async fn permission_status(&self) -> Result<PermissionStatus> {
        Ok(self.permissions.lock().unwrap().status)
    }

    async fn request_foreground_permission(&self) -> Result<PermissionStatus> {
        let mut script = self.permissions.lock().unwrap();
        if !matches!(script.status, PermissionStatus::Foreground | PermissionStatus::Background) {
            script.status = script.foreground_outcome;
        }
        Ok(script.status)
    }

    async fn request_background_permission(&self) -> Result<PermissionStatus> {
        let mut script = self.permissions.lock().unwrap();
        if script.status == PermissionStatus::Foreground {
            script.status = script.background_outcome;
        }
        Ok(script.status)
    }

    async fn start_updates(
        &self,
        options: UpdateOptions,
        on_fix: FixCallback,
    ) -> Result<UpdateHandle> {
        if let Some(reason) = &self.start_failure {
            return Err(GeoradarError::ProviderStart { reason: reason.clone() });
        }

        let handle = UpdateHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        let replay = if self.route.is_empty() {
            None
        } else {
            Some(self.spawn_replay(options, Arc::clone(&on_fix)))
        };

        self.streams.lock().unwrap().insert(handle, ActiveStream { callback: on_fix, replay });
        tracing::debug!(handle = handle.0, "Simulated location updates started");
        Ok(handle)
    }

    async fn stop_updates(&self, handle: UpdateHandle) -> Result<()> {
        if let Some(stream) = self.streams.lock().unwrap().remove(&handle) {
            if let Some(replay) = stream.replay {
                replay.abort();
            }
            tracing::debug!(handle = handle.0, "Simulated location updates stopped");
        }
        Ok(())
    }
}
