//! Producers of activity signals.
//!
//! Each source turns some platform event into an [`ActivitySignal`] and pushes
//! it into the [`ActivitySink`] handed over by the monitor. Sources are attached
//! once when the monitor is built and stay attached for its lifetime.
//!
//! - [`TouchEventSource`]: `onTouch` events from the native shell
//! - [`UnlockEventSource`]: the platform's unlock event from the native shell
//! - [`AppStateSource`]: the app moving to the foreground
//! - [`InputDeviceSource`]: keyboard, mouse and wheel input on desktop hosts

use crate::libs::error::AppResult;
use parking_lot::Mutex;
use rdev::{listen, Event, EventType};
use std::cell::Cell;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

include!(concat!(env!("OUT_DIR"), "/app_metadata.rs"));

/// Native event emitted by the shell on raw touch input.
pub const TOUCH_EVENT: &str = "onTouch";

const BRIDGE_CAPACITY: usize = 64;

/// Minimum spacing between forwarded desktop input events.
const INPUT_THROTTLE: std::time::Duration = std::time::Duration::from_millis(500);

#[cfg(target_os = "android")]
mod platform {
    pub const UNLOCK_EVENT: &str = "onUnlock";
}

#[cfg(not(target_os = "android"))]
mod platform {
    pub const UNLOCK_EVENT: &str = "screenUnlocked";
}

/// Name of the native unlock event on the target platform.
///
/// A non-empty `LIVELIFE_UNLOCK_EVENT` at build time takes precedence.
pub fn unlock_event_name() -> &'static str {
    if APP_METADATA_UNLOCK_EVENT_OVERRIDE.is_empty() {
        platform::UNLOCK_EVENT
    } else {
        APP_METADATA_UNLOCK_EVENT_OVERRIDE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitySignal {
    Touch,
    Foreground,
    Unlock,
}

/// Sending half of the monitor's signal queue.
#[derive(Debug, Clone)]
pub struct ActivitySink {
    sender: mpsc::UnboundedSender<ActivitySignal>,
}

impl ActivitySink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ActivitySignal>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Returns `false` once the receiving monitor is gone.
    pub fn emit(&self, signal: ActivitySignal) -> bool {
        self.sender.send(signal).is_ok()
    }
}

pub trait ActivitySource: Send {
    fn name(&self) -> &'static str;

    /// Starts forwarding signals into `sink`. Called exactly once.
    fn attach(self: Box<Self>, sink: ActivitySink) -> AppResult<()>;
}

/// Bus of named events pushed in by the native host shell.
#[derive(Debug, Clone)]
pub struct EventBridge {
    sender: broadcast::Sender<String>,
}

impl EventBridge {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BRIDGE_CAPACITY);
        Self { sender }
    }

    /// Publishes `event` and returns how many subscribers received it.
    pub fn emit(&self, event: &str) -> usize {
        self.sender.send(event.to_string()).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new()
    }
}

fn forward_bridge_event(bridge: &EventBridge, event_name: &'static str, signal: ActivitySignal, sink: ActivitySink) {
    let mut events = bridge.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) if event == event_name => {
                    if !sink.emit(signal) {
                        break;
                    }
                }
                Ok(_) => {}
                // Missed events still mean the user was there.
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(event = event_name, skipped, "event bridge lagged");
                    if !sink.emit(signal) {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

pub struct TouchEventSource {
    bridge: EventBridge,
}

impl TouchEventSource {
    pub fn new(bridge: &EventBridge) -> Self {
        Self { bridge: bridge.clone() }
    }
}

impl ActivitySource for TouchEventSource {
    fn name(&self) -> &'static str {
        "touch"
    }

    fn attach(self: Box<Self>, sink: ActivitySink) -> AppResult<()> {
        forward_bridge_event(&self.bridge, TOUCH_EVENT, ActivitySignal::Touch, sink);
        Ok(())
    }
}

/// Device unlock events; the native event name is chosen per platform.
pub struct UnlockEventSource {
    bridge: EventBridge,
    event_name: &'static str,
}

impl UnlockEventSource {
    pub fn new(bridge: &EventBridge) -> Self {
        Self {
            bridge: bridge.clone(),
            event_name: unlock_event_name(),
        }
    }

    pub fn event_name(&self) -> &'static str {
        self.event_name
    }
}

impl ActivitySource for UnlockEventSource {
    fn name(&self) -> &'static str {
        "unlock"
    }

    fn attach(self: Box<Self>, sink: ActivitySink) -> AppResult<()> {
        forward_bridge_event(&self.bridge, self.event_name, ActivitySignal::Unlock, sink);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Active,
    Inactive,
    Background,
}

/// Host-side handle used to report application state changes.
#[derive(Debug, Clone)]
pub struct AppStateHandle {
    current: Arc<Mutex<AppState>>,
    sender: mpsc::UnboundedSender<AppState>,
}

impl AppStateHandle {
    /// Reports the new state. Repeating the current state is ignored.
    pub fn set(&self, state: AppState) {
        let mut current = self.current.lock();
        if *current == state {
            return;
        }
        *current = state;
        let _ = self.sender.send(state);
    }

    pub fn current(&self) -> AppState {
        *self.current.lock()
    }
}

/// Emits [`ActivitySignal::Foreground`] whenever the app becomes active.
pub struct AppStateSource {
    changes: mpsc::UnboundedReceiver<AppState>,
}

impl AppStateSource {
    pub fn channel(initial: AppState) -> (AppStateHandle, Self) {
        let (sender, changes) = mpsc::unbounded_channel();
        let handle = AppStateHandle {
            current: Arc::new(Mutex::new(initial)),
            sender,
        };
        (handle, Self { changes })
    }
}

impl ActivitySource for AppStateSource {
    fn name(&self) -> &'static str {
        "app-state"
    }

    fn attach(self: Box<Self>, sink: ActivitySink) -> AppResult<()> {
        let mut changes = self.changes;
        tokio::spawn(async move {
            while let Some(state) = changes.recv().await {
                if state == AppState::Active && !sink.emit(ActivitySignal::Foreground) {
                    break;
                }
            }
        });
        Ok(())
    }
}

/// Global keyboard, mouse-button and wheel input, read with `rdev`.
///
/// `rdev::listen` blocks, so it runs on its own thread and is restarted after
/// a failure.
pub struct InputDeviceSource;

impl InputDeviceSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InputDeviceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivitySource for InputDeviceSource {
    fn name(&self) -> &'static str {
        "input-device"
    }

    fn attach(self: Box<Self>, sink: ActivitySink) -> AppResult<()> {
        std::thread::Builder::new().name("livelife-input".into()).spawn(move || loop {
            let listener_sink = sink.clone();
            let last_forwarded: Cell<Option<std::time::Instant>> = Cell::new(None);
            let result = listen(move |event: Event| {
                if !matches!(event.event_type, EventType::KeyPress(_) | EventType::ButtonPress(_) | EventType::Wheel { .. }) {
                    return;
                }
                let now = std::time::Instant::now();
                if last_forwarded.get().is_some_and(|at| now.duration_since(at) < INPUT_THROTTLE) {
                    return;
                }
                last_forwarded.set(Some(now));
                listener_sink.emit(ActivitySignal::Touch);
            });
            match result {
                Err(e) => {
                    warn!(error = ?e, "input listener failed, retrying in 1 second");
                    std::thread::sleep(std::time::Duration::from_secs(1));
                }
                // listen only returns Ok when the platform hook shuts down
                Ok(()) => break,
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlock_event_name_matches_platform() {
        if APP_METADATA_UNLOCK_EVENT_OVERRIDE.is_empty() {
            assert_eq!(unlock_event_name(), platform::UNLOCK_EVENT);
        }
        assert!(!unlock_event_name().is_empty());
    }

    #[test]
    fn test_app_state_handle_ignores_repeats() {
        let (handle, mut source) = AppStateSource::channel(AppState::Active);
        handle.set(AppState::Active);
        handle.set(AppState::Background);
        handle.set(AppState::Background);
        handle.set(AppState::Active);

        assert_eq!(source.changes.try_recv().ok(), Some(AppState::Background));
        assert_eq!(source.changes.try_recv().ok(), Some(AppState::Active));
        assert!(source.changes.try_recv().is_err());
        assert_eq!(handle.current(), AppState::Active);
    }
}
