//! Inactivity detection and emergency trigger.
//!
//! The [`ActivityMonitor`] tracks when the user was last seen, runs a periodic
//! liveness check and invokes an [`InactivityHandler`] once the time since the
//! last activity signal reaches the configured check interval.
//!
//! ## Signals
//!
//! Activity arrives from [`ActivitySource`]s attached at construction (touch or
//! input events, the app coming to the foreground, the device being unlocked)
//! or from direct calls to [`ActivityMonitor::record_activity`]. Every recorded
//! activity notifies the registered listeners with `is_active = true`.
//!
//! ## Periodic check
//!
//! While monitoring, every `check_interval`:
//!
//! 1. `elapsed = now - last_active_time`
//! 2. `is_active = elapsed < check_interval`
//! 3. listeners receive `{ last_active_time, is_active }`
//! 4. when inactive the handler runs, then the check window restarts from the
//!    current moment so one trigger fires per window instead of a burst.
//!
//! A handler error or panic is logged and never stops the schedule. A check
//! that is already running when `stop_monitoring` is called does not
//! reschedule itself.
//!
//! ## Threading
//!
//! All state sits behind one mutex. Listeners and the handler are called with
//! the lock released, so they may call back into the monitor (for example to
//! stop it). A panicking listener is logged and skipped. The handler runs on
//! Tokio's blocking pool and may do blocking I/O such as reading the contact
//! store. Constructing a monitor requires a running Tokio runtime.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use livelife::libs::alert::LogInactivityHandler;
//! use livelife::libs::monitor::ActivityMonitor;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let monitor = ActivityMonitor::new(30 * 60 * 1000, LogInactivityHandler, Vec::new())?;
//! let id = monitor.add_listener(|status| println!("active: {}", status.is_active));
//! monitor.start_monitoring();
//! monitor.record_activity();
//! monitor.remove_listener(id);
//! monitor.dispose();
//! # Ok(())
//! # }
//! ```

use crate::libs::alert::InactivityHandler;
use crate::libs::error::{AppError, AppResult};
use crate::libs::listeners::{notify_all, ListenerId, Listeners};
use crate::libs::sources::{ActivitySignal, ActivitySink, ActivitySource};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// 30 minutes.
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 1_800_000;

/// Snapshot of the user's activity at one moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityStatus {
    pub last_active_time: DateTime<Local>,
    pub is_active: bool,
}

struct MonitorState {
    last_active_time: DateTime<Local>,
    // Monotonic twin of `last_active_time`, used for the elapsed computation.
    last_active_at: Instant,
    check_interval: Duration,
    timer: Option<JoinHandle<()>>,
    // Bumped on every start/stop so a stale check can tell it was replaced.
    generation: u64,
    listeners: Listeners<ActivityStatus>,
    pump: Option<JoinHandle<()>>,
}

enum CheckOutcome {
    Active,
    Inactive(ActivityStatus),
    Stale,
}

struct Shared {
    state: Mutex<MonitorState>,
    handler: Arc<dyn InactivityHandler>,
}

impl Shared {
    fn record_activity(&self) {
        let (status, listeners) = {
            let mut state = self.state.lock();
            state.last_active_time = Local::now();
            state.last_active_at = Instant::now();
            let status = ActivityStatus {
                last_active_time: state.last_active_time,
                is_active: true,
            };
            (status, state.listeners.snapshot())
        };
        notify_all(&listeners, &status);
    }

    fn check_activity(&self, generation: u64) -> CheckOutcome {
        let (status, listeners) = {
            let state = self.state.lock();
            if !state.is_current(generation) {
                return CheckOutcome::Stale;
            }
            let elapsed = state.last_active_at.elapsed();
            let status = ActivityStatus {
                last_active_time: state.last_active_time,
                is_active: elapsed < state.check_interval,
            };
            (status, state.listeners.snapshot())
        };

        notify_all(&listeners, &status);

        if status.is_active {
            debug!(last_active = %status.last_active_time, "activity check passed");
            CheckOutcome::Active
        } else {
            CheckOutcome::Inactive(status)
        }
    }

    async fn trigger(&self, status: ActivityStatus) {
        warn!(last_active = %status.last_active_time, "no user activity within the check interval, triggering inactivity handler");
        let handler = Arc::clone(&self.handler);
        match task::spawn_blocking(move || handler.on_inactivity(&status)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "inactivity handler failed"),
            Err(e) if e.is_panic() => warn!("inactivity handler panicked"),
            Err(_) => debug!("inactivity handler cancelled"),
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.lock().is_current(generation)
    }
}

impl MonitorState {
    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.timer.is_some()
    }

    fn cancel_timer(&mut self) -> bool {
        self.generation += 1;
        match self.timer.take() {
            Some(timer) => {
                timer.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        state.cancel_timer();
        if let Some(pump) = state.pump.take() {
            pump.abort();
        }
    }
}

/// Handle to the process-wide activity monitor.
///
/// Cloning is cheap and every clone drives the same monitor. The composition
/// root creates exactly one and hands clones to whoever needs it.
#[derive(Clone)]
pub struct ActivityMonitor {
    shared: Arc<Shared>,
}

impl ActivityMonitor {
    /// Creates the monitor and attaches the given activity sources.
    ///
    /// The last activity time starts at the moment of construction. Monitoring
    /// is not started; call [`start_monitoring`](Self::start_monitoring).
    /// A source that fails to attach is logged and skipped.
    pub fn new<H>(check_interval_ms: u64, handler: H, sources: Vec<Box<dyn ActivitySource>>) -> AppResult<Self>
    where
        H: InactivityHandler + 'static,
    {
        let check_interval = interval_from_ms(check_interval_ms)?;
        let shared = Arc::new(Shared {
            state: Mutex::new(MonitorState {
                last_active_time: Local::now(),
                last_active_at: Instant::now(),
                check_interval,
                timer: None,
                generation: 0,
                listeners: Listeners::new(),
                pump: None,
            }),
            handler: Arc::new(handler),
        });

        let (sink, signals) = ActivitySink::channel();
        for source in sources {
            let name = source.name();
            match source.attach(sink.clone()) {
                Ok(()) => debug!(source = name, "activity source attached"),
                Err(e) => warn!(source = name, error = %e, "activity source failed to attach"),
            }
        }
        let pump = tokio::spawn(pump_signals(Arc::downgrade(&shared), signals));
        shared.state.lock().pump = Some(pump);

        Ok(Self { shared })
    }

    /// Replaces the check interval and restarts the periodic check with it.
    ///
    /// Zero is rejected. The restart happens even if monitoring was stopped,
    /// matching the behaviour of a fresh `start_monitoring`.
    pub fn set_check_interval(&self, interval_ms: u64) -> AppResult<()> {
        let check_interval = interval_from_ms(interval_ms)?;
        let mut state = self.shared.state.lock();
        state.check_interval = check_interval;
        state.cancel_timer();
        self.spawn_timer(&mut state);
        info!(interval_ms, "check interval updated");
        Ok(())
    }

    /// Starts the periodic check, replacing one that is already running.
    pub fn start_monitoring(&self) {
        let mut state = self.shared.state.lock();
        state.cancel_timer();
        self.spawn_timer(&mut state);
        info!(interval_ms = state.check_interval.as_millis() as u64, "activity monitoring started");
    }

    /// Cancels the periodic check. Safe to call when not monitoring.
    pub fn stop_monitoring(&self) {
        if self.shared.state.lock().cancel_timer() {
            info!("activity monitoring stopped");
        }
    }

    /// Marks the user as active now and tells every listener so.
    pub fn record_activity(&self) {
        self.shared.record_activity();
    }

    pub fn add_listener<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&ActivityStatus) + Send + Sync + 'static,
    {
        self.shared.state.lock().listeners.add(callback)
    }

    /// Unregisters a listener. Returns `false` for an unknown handle.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.state.lock().listeners.remove(id)
    }

    /// Current snapshot. `is_active` is always reported as `true` here; only the
    /// periodic check evaluates the threshold.
    pub fn activity_status(&self) -> ActivityStatus {
        let state = self.shared.state.lock();
        ActivityStatus {
            last_active_time: state.last_active_time,
            is_active: true,
        }
    }

    pub fn check_interval(&self) -> Duration {
        self.shared.state.lock().check_interval
    }

    pub fn is_monitoring(&self) -> bool {
        self.shared.state.lock().timer.is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.shared.state.lock().listeners.len()
    }

    /// Stops monitoring, detaches the sources and drops every listener.
    pub fn dispose(&self) {
        let mut state = self.shared.state.lock();
        state.cancel_timer();
        if let Some(pump) = state.pump.take() {
            pump.abort();
        }
        state.listeners.clear();
        debug!("activity monitor disposed");
    }

    fn spawn_timer(&self, state: &mut MonitorState) {
        let generation = state.generation;
        let timer = tokio::spawn(run_checks(Arc::downgrade(&self.shared), generation, state.check_interval));
        state.timer = Some(timer);
    }
}

fn interval_from_ms(interval_ms: u64) -> AppResult<Duration> {
    if interval_ms == 0 {
        return Err(AppError::InvalidInterval(interval_ms));
    }
    Ok(Duration::from_millis(interval_ms))
}

async fn run_checks(shared: Weak<Shared>, generation: u64, period: Duration) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(strong) = shared.upgrade() else { break };
        match strong.check_activity(generation) {
            CheckOutcome::Active => {}
            CheckOutcome::Inactive(status) => {
                strong.trigger(status).await;
                // stop_monitoring or set_check_interval may have run while the handler did
                if !strong.is_current(generation) {
                    break;
                }
                // The next window starts now, not on the original schedule.
                ticker.reset();
            }
            CheckOutcome::Stale => break,
        }
    }
}

async fn pump_signals(shared: Weak<Shared>, mut signals: mpsc::UnboundedReceiver<ActivitySignal>) {
    while let Some(signal) = signals.recv().await {
        let Some(strong) = shared.upgrade() else { break };
        debug!(?signal, "activity signal received");
        strong.record_activity();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::alert::LogInactivityHandler;

    fn quiet_monitor(interval_ms: u64) -> ActivityMonitor {
        ActivityMonitor::new(interval_ms, LogInactivityHandler, Vec::new()).unwrap()
    }

    #[tokio::test]
    async fn test_zero_interval_is_rejected() {
        let result = ActivityMonitor::new(0, LogInactivityHandler, Vec::new());
        assert!(matches!(result, Err(AppError::InvalidInterval(0))));

        let monitor = quiet_monitor(1000);
        assert!(monitor.set_check_interval(0).is_err());
        assert_eq!(monitor.check_interval(), Duration::from_millis(1000));
        assert!(!monitor.is_monitoring(), "a rejected interval must not start monitoring");
    }

    #[tokio::test]
    async fn test_start_and_stop_are_idempotent() {
        let monitor = quiet_monitor(1000);
        monitor.stop_monitoring();
        assert!(!monitor.is_monitoring());

        monitor.start_monitoring();
        monitor.start_monitoring();
        assert!(monitor.is_monitoring());

        monitor.stop_monitoring();
        monitor.stop_monitoring();
        assert!(!monitor.is_monitoring());
    }

    #[tokio::test]
    async fn test_status_reports_active_regardless_of_elapsed_time() {
        let monitor = quiet_monitor(1);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(monitor.activity_status().is_active);
    }

    #[tokio::test]
    async fn test_dispose_clears_listeners() {
        let monitor = quiet_monitor(1000);
        monitor.add_listener(|_| {});
        monitor.start_monitoring();

        monitor.dispose();

        assert_eq!(monitor.listener_count(), 0);
        assert!(!monitor.is_monitoring());
    }
}
