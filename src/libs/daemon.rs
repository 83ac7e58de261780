//! Watcher process lifecycle for the `watch` command.
//!
//! The watcher is the composition root: it reads the configuration, builds the
//! single [`ActivityMonitor`] with its sources and alert handler, and runs it
//! until a shutdown signal arrives. It can run in the foreground or as a
//! detached background process tracked through a PID file.

use crate::db::contacts::Contacts;
use crate::libs::alert::{ContactAlertHandler, LogNotifier};
use crate::libs::config::{Config, LocationConfig};
use crate::libs::data_storage::DataStorage;
use crate::libs::location::{LocationTracker, StaticLocationProvider, WatchOptions};
use crate::libs::messages::Message;
use crate::libs::monitor::ActivityMonitor;
use crate::libs::permission::{PermissionService, StaticPermissionGate};
use crate::libs::sources::{ActivitySource, AppState, AppStateHandle, AppStateSource, EventBridge, InputDeviceSource, TouchEventSource, UnlockEventSource};
use crate::{msg_bail_anyhow, msg_debug, msg_error, msg_error_anyhow, msg_info, msg_warning};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

const PID_FILE: &str = "livelife-watch.pid";

/// Runs the watcher in the current process until SIGTERM, SIGINT or Ctrl-C.
pub async fn run_with_signal_handling() -> Result<()> {
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).map_err(|_| msg_error_anyhow!(Message::FailedToCreateSigtermHandler))?;
        let mut sigint = signal(SignalKind::interrupt()).map_err(|_| msg_error_anyhow!(Message::FailedToCreateSigintHandler))?;
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => msg_info!(Message::WatcherReceivedSigterm),
                _ = sigint.recv() => msg_info!(Message::WatcherReceivedSigint),
            }
            let _ = shutdown_tx.send(());
        });
    }

    #[cfg(windows)]
    {
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => msg_info!(Message::WatcherReceivedCtrlC),
                Err(e) => msg_error!(Message::WatcherCtrlCListenFailed(e.to_string())),
            }
            let _ = shutdown_tx.send(());
        });
    }

    #[cfg(not(any(unix, windows)))]
    {
        msg_warning!(Message::WatcherSignalHandlingNotSupported);
        std::mem::forget(shutdown_tx);
    }

    let config = Config::read()?;
    let bridge = EventBridge::new();
    let (app_state, monitor) = build_monitor(&config, &bridge)?;
    monitor.start_monitoring();
    msg_info!(Message::MonitorStarted {
        check_interval_minutes: monitor.check_interval().as_secs() / 60,
    });
    spawn_stdin_bridge(bridge, app_state);

    let _ = shutdown_rx.await;
    msg_info!(Message::MonitorShuttingDown);
    monitor.dispose();

    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    if pid_path.exists() {
        let _ = std::fs::remove_file(&pid_path);
    }

    Ok(())
}

/// Wires the monitor: sources, alert handler and a status listener.
pub fn build_monitor(config: &Config, bridge: &EventBridge) -> Result<(AppStateHandle, ActivityMonitor)> {
    let monitor_config = config.monitor.clone().unwrap_or_default();

    let mut handler = ContactAlertHandler::new(Contacts::new()?, LogNotifier);
    if let Some(tracker) = config.location.as_ref().and_then(build_location_tracker) {
        handler = handler.with_location(tracker);
    }

    let (app_state, app_state_source) = AppStateSource::channel(AppState::Active);
    let mut sources: Vec<Box<dyn ActivitySource>> = vec![
        Box::new(TouchEventSource::new(bridge)),
        Box::new(app_state_source),
        Box::new(UnlockEventSource::new(bridge)),
    ];
    if monitor_config.input_events {
        sources.push(Box::new(InputDeviceSource::new()));
    }

    let monitor = ActivityMonitor::new(monitor_config.check_interval, handler, sources)?;
    monitor.add_listener(|status| {
        if status.is_active {
            msg_debug!(format!("activity at {}", status.last_active_time.format("%H:%M:%S")));
        } else {
            msg_warning!(Message::InactivityDetected(status.last_active_time.format("%Y-%m-%d %H:%M:%S").to_string()));
        }
    });

    Ok((app_state, monitor))
}

fn build_location_tracker(config: &LocationConfig) -> Option<Arc<LocationTracker>> {
    let (latitude, longitude) = config.fixed_position()?;
    let gate = Arc::new(StaticPermissionGate::granted());
    if !PermissionService::new(gate.clone()).request_all_permissions() {
        msg_warning!(Message::PermissionsRequired);
        return None;
    }

    let tracker = LocationTracker::new(Arc::new(StaticLocationProvider::new(latitude, longitude)), gate).with_watch_options(WatchOptions::from(config));
    match tracker.start_tracking() {
        Ok(true) => Some(Arc::new(tracker)),
        Ok(false) => {
            msg_warning!(Message::PermissionsRequired);
            None
        }
        Err(e) => {
            msg_error!(Message::LocationUnavailable(e.to_string()));
            None
        }
    }
}

/// Lets a native shell (or a person at the terminal) feed events on stdin.
///
/// Each line is either an app state (`active`, `inactive`, `background`) or a
/// native event name such as `onTouch`.
fn spawn_stdin_bridge(bridge: EventBridge, app_state: AppStateHandle) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match line.trim() {
                "" => {}
                "active" => app_state.set(AppState::Active),
                "inactive" => app_state.set(AppState::Inactive),
                "background" => app_state.set(AppState::Background),
                event => {
                    bridge.emit(event);
                }
            }
        }
    });
}

/// Starts the watcher as a detached background process, replacing a running one.
pub fn spawn() -> Result<()> {
    let pid_path = DataStorage::new().get_path(PID_FILE)?;

    if pid_path.exists() {
        if let Ok(pid_str) = std::fs::read_to_string(&pid_path) {
            msg_info!(Message::WatcherStoppingExisting(pid_str.trim().to_string()));
            if let Err(e) = stop_internal() {
                msg_warning!(Message::WatcherFailedToStopExisting(e.to_string()));
                let _ = std::fs::remove_file(&pid_path);
            }
            std::thread::sleep(Duration::from_millis(1000));
        }
    }

    let current_exe = std::env::current_exe().map_err(|_| msg_error_anyhow!(Message::FailedToGetCurrentExecutable))?;

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let mut command = std::process::Command::new(current_exe);
        command.args(["watch", "--foreground"]).stdin(std::process::Stdio::null());
        // SAFETY: setsid is async-signal-safe and touches no parent state.
        unsafe {
            command.pre_exec(|| {
                nix::unistd::setsid()?;
                Ok(())
            });
        }
        let child = command.spawn()?;
        let pid = child.id();
        std::fs::write(pid_path, pid.to_string())?;
        msg_info!(Message::WatcherStarted(pid));
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        let child = std::process::Command::new(current_exe)
            .args(["watch", "--foreground"])
            .stdin(std::process::Stdio::null())
            .creation_flags(CREATE_NO_WINDOW)
            .spawn()?;
        let pid = child.id();
        std::fs::write(pid_path, pid.to_string())?;
        msg_info!(Message::WatcherStarted(pid));
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = current_exe;
        msg_bail_anyhow!(Message::DaemonModeNotSupported);
    }

    Ok(())
}

/// Stops the background watcher. Not running is not an error.
pub fn stop() -> Result<()> {
    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    if !pid_path.exists() {
        msg_info!(Message::WatcherNotRunning);
        return Ok(());
    }
    stop_internal()
}

fn stop_internal() -> Result<()> {
    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    let pid = read_pid(&pid_path)?;

    if stop_pid_file(&pid_path)? {
        msg_info!(Message::WatcherStopped(pid));
    } else {
        msg_warning!(Message::WatcherNotRunning);
    }
    Ok(())
}

fn read_pid(pid_path: &Path) -> Result<u32> {
    if !pid_path.exists() {
        msg_bail_anyhow!(Message::WatcherNotRunningPidNotFound);
    }
    let pid_str = std::fs::read_to_string(pid_path)?;
    match pid_str.trim().parse::<u32>() {
        // 0 and values past i32::MAX address process groups, not a single process
        Ok(pid) if pid > 0 && pid <= i32::MAX as u32 => Ok(pid),
        _ => Err(msg_error_anyhow!(Message::InvalidPidFileContent)),
    }
}

/// Terminates the process named in `pid_path` and removes the file.
///
/// Returns `false` when the process was already gone.
pub fn stop_pid_file(pid_path: &Path) -> Result<bool> {
    let pid = read_pid(pid_path)?;
    let killed = kill_process(pid)?;

    // The watcher removes its own PID file on a graceful shutdown.
    match std::fs::remove_file(pid_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    Ok(killed)
}

#[cfg(windows)]
fn kill_process(pid: u32) -> Result<bool> {
    use winapi::um::errhandlingapi::GetLastError;
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::{OpenProcess, TerminateProcess};
    use winapi::um::winnt::PROCESS_TERMINATE;

    unsafe {
        let handle = OpenProcess(PROCESS_TERMINATE, 0, pid);
        if handle.is_null() {
            let error = GetLastError();
            // ERROR_INVALID_PARAMETER: no such process
            if error == 87 {
                return Ok(false);
            }
            msg_bail_anyhow!(Message::FailedToOpenProcess(error));
        }

        let result = TerminateProcess(handle, 0);
        CloseHandle(handle);

        if result == 0 {
            msg_bail_anyhow!(Message::FailedToTerminateProcess(GetLastError()));
        }
        std::thread::sleep(Duration::from_millis(100));
        Ok(true)
    }
}

#[cfg(unix)]
fn kill_process(pid: u32) -> Result<bool> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pid = Pid::from_raw(pid as i32);
    match kill(pid, Signal::SIGTERM) {
        Ok(()) => {}
        Err(Errno::ESRCH) => return Ok(false),
        Err(e) => return Err(e.into()),
    }

    // Give the watcher time to dispose the monitor and remove its PID file.
    for _ in 0..10 {
        std::thread::sleep(Duration::from_millis(100));
        if kill(pid, None).is_err() {
            return Ok(true);
        }
    }

    let _ = kill(pid, Signal::SIGKILL);
    std::thread::sleep(Duration::from_millis(100));
    Ok(true)
}

#[cfg(not(any(unix, windows)))]
fn kill_process(_pid: u32) -> Result<bool> {
    msg_bail_anyhow!(Message::ProcessTerminationNotSupported);
}
