//! Location access for emergency alerts.
//!
//! [`LocationProvider`] is the narrow interface to the platform's geolocation
//! service. [`LocationTracker`] sits on top of it: it asks the
//! [`PermissionGate`] first, keeps at most one watch running, caches the last
//! known position and fans updates out to its listeners.

use crate::libs::error::{AppError, AppResult};
use crate::libs::listeners::{notify_all, ListenerId, Listeners};
use crate::libs::permission::PermissionGate;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    /// Radius of uncertainty in meters, when the provider reports one.
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accuracy {
    High,
    Balanced,
}

/// Options for continuous updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    pub accuracy: Accuracy,
    /// Minimum movement before a new update is delivered.
    pub min_distance_meters: f64,
    pub min_interval_ms: u64,
    pub fastest_interval_ms: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        WatchOptions {
            accuracy: Accuracy::High,
            min_distance_meters: 10.0,
            min_interval_ms: 5000,
            fastest_interval_ms: 2000,
        }
    }
}

/// Options for a one-shot fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixOptions {
    pub accuracy: Accuracy,
    pub timeout_ms: u64,
    /// A cached position younger than this may be returned.
    pub maximum_age_ms: u64,
}

impl Default for FixOptions {
    fn default() -> Self {
        FixOptions {
            accuracy: Accuracy::High,
            timeout_ms: 15_000,
            maximum_age_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

pub type WatchCallback = Box<dyn Fn(AppResult<LocationData>) + Send + Sync>;

pub trait LocationProvider: Send + Sync {
    fn current_location(&self, options: &FixOptions) -> AppResult<LocationData>;

    /// Delivers every update (or provider error) to `callback` until cleared.
    fn watch_location(&self, callback: WatchCallback, options: &WatchOptions) -> AppResult<WatchId>;

    fn clear_watch(&self, id: WatchId);
}

/// Provider that always reports one configured position.
///
/// Used on desktop hosts where the user enters where they are.
pub struct StaticLocationProvider {
    latitude: f64,
    longitude: f64,
    next_watch: AtomicU64,
}

impl StaticLocationProvider {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            next_watch: AtomicU64::new(1),
        }
    }

    fn fix(&self) -> LocationData {
        LocationData {
            latitude: self.latitude,
            longitude: self.longitude,
            timestamp: Utc::now(),
            accuracy: None,
        }
    }
}

impl LocationProvider for StaticLocationProvider {
    fn current_location(&self, _options: &FixOptions) -> AppResult<LocationData> {
        Ok(self.fix())
    }

    fn watch_location(&self, callback: WatchCallback, _options: &WatchOptions) -> AppResult<WatchId> {
        // A fixed position never moves, so one update is all a watcher gets.
        callback(Ok(self.fix()));
        Ok(WatchId(self.next_watch.fetch_add(1, Ordering::Relaxed)))
    }

    fn clear_watch(&self, _id: WatchId) {}
}

#[derive(Default)]
struct TrackerState {
    current: Option<LocationData>,
    watch_id: Option<WatchId>,
    listeners: Listeners<LocationData>,
}

pub struct LocationTracker {
    provider: Arc<dyn LocationProvider>,
    permissions: Arc<dyn PermissionGate>,
    watch_options: WatchOptions,
    fix_options: FixOptions,
    state: Arc<Mutex<TrackerState>>,
}

impl LocationTracker {
    pub fn new(provider: Arc<dyn LocationProvider>, permissions: Arc<dyn PermissionGate>) -> Self {
        Self {
            provider,
            permissions,
            watch_options: WatchOptions::default(),
            fix_options: FixOptions::default(),
            state: Arc::new(Mutex::new(TrackerState::default())),
        }
    }

    pub fn with_watch_options(mut self, options: WatchOptions) -> Self {
        self.watch_options = options;
        self
    }

    pub fn with_fix_options(mut self, options: FixOptions) -> Self {
        self.fix_options = options;
        self
    }

    /// Starts continuous tracking, replacing a running watch.
    ///
    /// Returns `Ok(false)` when location permission is refused.
    pub fn start_tracking(&self) -> AppResult<bool> {
        if !self.permissions.request_location_permission() {
            error!("location permission denied, tracking not started");
            return Ok(false);
        }

        self.stop_tracking();

        let state = Arc::clone(&self.state);
        let callback: WatchCallback = Box::new(move |update| match update {
            Ok(location) => {
                let listeners = {
                    let mut state = state.lock();
                    state.current = Some(location);
                    state.listeners.snapshot()
                };
                notify_all(&listeners, &location);
            }
            Err(e) => error!(error = %e, "location watch error"),
        });

        let watch_id = self.provider.watch_location(callback, &self.watch_options)?;
        self.state.lock().watch_id = Some(watch_id);
        debug!(watch = watch_id.0, "location tracking started");
        Ok(true)
    }

    /// Stops tracking. Safe to call when not tracking.
    pub fn stop_tracking(&self) {
        let watch_id = self.state.lock().watch_id.take();
        if let Some(watch_id) = watch_id {
            self.provider.clear_watch(watch_id);
            debug!(watch = watch_id.0, "location tracking stopped");
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.state.lock().watch_id.is_some()
    }

    /// One-shot fix, cached as the last known location.
    pub fn current_location(&self) -> AppResult<LocationData> {
        if !self.permissions.request_location_permission() {
            return Err(AppError::PermissionDenied("location".to_string()));
        }
        let location = self.provider.current_location(&self.fix_options).inspect_err(|e| warn!(error = %e, "failed to get location"))?;
        self.state.lock().current = Some(location);
        Ok(location)
    }

    pub fn last_known_location(&self) -> Option<LocationData> {
        self.state.lock().current
    }

    pub fn add_listener<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&LocationData) + Send + Sync + 'static,
    {
        self.state.lock().listeners.add(callback)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.state.lock().listeners.remove(id)
    }
}

impl Drop for LocationTracker {
    fn drop(&mut self) {
        self.stop_tracking();
    }
}
