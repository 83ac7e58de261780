#[cfg(test)]
mod tests {
    use chrono::Utc;
    use livelife::libs::error::{AppError, AppResult};
    use livelife::libs::location::{FixOptions, LocationData, LocationProvider, LocationTracker, StaticLocationProvider, WatchCallback, WatchId, WatchOptions};
    use livelife::libs::permission::{PermissionGate, PermissionService, StaticPermissionGate};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    /// Provider whose watch updates are pushed by the test.
    #[derive(Default)]
    struct ScriptedProvider {
        callback: Mutex<Option<WatchCallback>>,
        next_id: AtomicU64,
        cleared: Mutex<Vec<WatchId>>,
        fail_fix: bool,
    }

    impl ScriptedProvider {
        fn push(&self, update: AppResult<LocationData>) {
            if let Some(callback) = self.callback.lock().unwrap().as_ref() {
                callback(update);
            }
        }
    }

    impl LocationProvider for ScriptedProvider {
        fn current_location(&self, _options: &FixOptions) -> AppResult<LocationData> {
            if self.fail_fix {
                return Err(AppError::Provider("timeout".to_string()));
            }
            Ok(fix(1.0, 2.0))
        }

        fn watch_location(&self, callback: WatchCallback, _options: &WatchOptions) -> AppResult<WatchId> {
            *self.callback.lock().unwrap() = Some(callback);
            Ok(WatchId(self.next_id.fetch_add(1, Ordering::SeqCst)))
        }

        fn clear_watch(&self, id: WatchId) {
            self.cleared.lock().unwrap().push(id);
            *self.callback.lock().unwrap() = None;
        }
    }

    fn fix(latitude: f64, longitude: f64) -> LocationData {
        LocationData {
            latitude,
            longitude,
            timestamp: Utc::now(),
            accuracy: Some(5.0),
        }
    }

    #[test]
    fn test_tracking_caches_and_fans_out_updates() {
        let provider = Arc::new(ScriptedProvider::default());
        let tracker = LocationTracker::new(provider.clone(), Arc::new(StaticPermissionGate::granted()));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        tracker.add_listener(move |location| sink.lock().unwrap().push(location.latitude));

        assert!(tracker.start_tracking().unwrap());
        assert!(tracker.is_tracking());

        provider.push(Ok(fix(31.23, 121.47)));
        provider.push(Err(AppError::Provider("gps lost".to_string())));
        provider.push(Ok(fix(31.24, 121.48)));

        assert_eq!(*seen.lock().unwrap(), vec![31.23, 31.24]);
        assert_eq!(tracker.last_known_location().map(|l| l.longitude), Some(121.48));
    }

    #[test]
    fn test_restart_replaces_previous_watch() {
        let provider = Arc::new(ScriptedProvider::default());
        let tracker = LocationTracker::new(provider.clone(), Arc::new(StaticPermissionGate::granted()));

        tracker.start_tracking().unwrap();
        tracker.start_tracking().unwrap();
        assert_eq!(*provider.cleared.lock().unwrap(), vec![WatchId(0)]);

        tracker.stop_tracking();
        tracker.stop_tracking();
        assert!(!tracker.is_tracking());
        assert_eq!(*provider.cleared.lock().unwrap(), vec![WatchId(0), WatchId(1)]);
    }

    #[test]
    fn test_denied_permission_blocks_location() {
        let provider = Arc::new(ScriptedProvider::default());
        let tracker = LocationTracker::new(provider.clone(), Arc::new(StaticPermissionGate::denied()));

        assert!(!tracker.start_tracking().unwrap());
        assert!(!tracker.is_tracking());
        assert!(matches!(tracker.current_location(), Err(AppError::PermissionDenied(_))));
        assert_eq!(tracker.last_known_location(), None);
    }

    #[test]
    fn test_one_shot_fix_is_cached() {
        let provider = Arc::new(ScriptedProvider::default());
        let tracker = LocationTracker::new(provider, Arc::new(StaticPermissionGate::granted()));

        let location = tracker.current_location().unwrap();
        assert_eq!(tracker.last_known_location(), Some(location));
    }

    #[test]
    fn test_failed_fix_keeps_previous_location() {
        let provider = Arc::new(ScriptedProvider {
            fail_fix: true,
            ..Default::default()
        });
        let tracker = LocationTracker::new(provider, Arc::new(StaticPermissionGate::granted()));

        assert!(matches!(tracker.current_location(), Err(AppError::Provider(_))));
        assert_eq!(tracker.last_known_location(), None);
    }

    #[test]
    fn test_removed_listener_gets_no_updates() {
        let provider = Arc::new(ScriptedProvider::default());
        let tracker = LocationTracker::new(provider.clone(), Arc::new(StaticPermissionGate::granted()));
        let seen = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&seen);
        let id = tracker.add_listener(move |_| *counter.lock().unwrap() += 1);

        tracker.start_tracking().unwrap();
        provider.push(Ok(fix(0.0, 0.0)));
        assert!(tracker.remove_listener(id));
        provider.push(Ok(fix(0.0, 0.0)));

        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn test_static_provider_reports_configured_position() {
        let tracker = LocationTracker::new(Arc::new(StaticLocationProvider::new(48.85, 2.35)), Arc::new(StaticPermissionGate::granted()));
        assert!(tracker.start_tracking().unwrap());

        let location = tracker.last_known_location().unwrap();
        assert_eq!((location.latitude, location.longitude), (48.85, 2.35));
        assert_eq!(location.accuracy, None);
    }

    #[test]
    fn test_permission_service_reports_gate_answer() {
        let granted: Arc<dyn PermissionGate> = Arc::new(StaticPermissionGate::granted());
        let denied: Arc<dyn PermissionGate> = Arc::new(StaticPermissionGate::denied());

        assert!(PermissionService::new(granted).request_all_permissions());
        let service = PermissionService::new(denied);
        assert!(!service.request_all_permissions());
        assert!(!service.check_location_permission());
    }
}
