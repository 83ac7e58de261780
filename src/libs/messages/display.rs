//! Text for every [`Message`].
//!
//! All wording shown to the user is kept in this one match so it can be
//! reviewed (or translated) in a single place.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CONTACT MESSAGES ===
            Message::ContactCreated(name) => format!("Emergency contact '{}' added", name),
            Message::ContactUpdated(name) => format!("Emergency contact '{}' updated", name),
            Message::ContactDeleted(name) => format!("Emergency contact '{}' deleted", name),
            Message::ContactNotFound(id) => format!("No emergency contact with id {}", id),
            Message::ContactActivated(name) => format!("'{}' will be alerted", name),
            Message::ContactDeactivated(name) => format!("'{}' will no longer be alerted", name),
            Message::ContactSaveFailed => "Failed to save emergency contact, please try again later".to_string(),
            Message::ContactsHeader => "Emergency contacts:".to_string(),
            Message::InvalidContact(reason) => format!("Invalid contact: {}", reason),
            Message::NoContacts => "No emergency contacts yet. Add one with `livelife contact add`.".to_string(),
            Message::NoChangesProvided => "Nothing to change".to_string(),
            Message::ConfirmDeleteContact(name) => format!("Delete emergency contact '{}'?", name),
            Message::SelectContactToEdit => "Select a contact to edit".to_string(),
            Message::SelectContactToDelete => "Select a contact to delete".to_string(),
            Message::SelectContactToToggle => "Select a contact to enable or disable".to_string(),
            Message::OperationCancelled => "Operation cancelled".to_string(),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration removed, defaults will be used".to_string(),
            Message::ConfigFileNotFound => "No configuration file found".to_string(),
            Message::ConfigModuleMonitor => "Monitor settings".to_string(),
            Message::ConfigModuleLocation => "Location settings".to_string(),

            // === MONITOR MESSAGES ===
            Message::MonitorStarted { check_interval_minutes } => format!(
                "Monitor is running, contacts are alerted after {} minute(s) without activity",
                check_interval_minutes
            ),
            Message::MonitorShuttingDown => "Shutting down monitor...".to_string(),
            Message::InactivityDetected(since) => format!("No activity since {}, alerting emergency contacts", since),
            Message::PermissionsRequired => "Location permission is required to include your position in alerts".to_string(),
            Message::LocationUnavailable(error) => format!("Location unavailable: {}", error),

            // === WATCHER MESSAGES ===
            Message::WatcherStarted(pid) => format!("Watcher started in the background (PID: {}).", pid),
            Message::WatcherStopped(pid) => format!("Watcher process (PID: {}) stopped successfully.", pid),
            Message::WatcherNotRunning => "Watcher is not running.".to_string(),
            Message::WatcherNotRunningPidNotFound => "Watcher does not appear to be running (PID file not found).".to_string(),
            Message::WatcherStoppingExisting(pid) => format!("Stopping existing watcher (PID: {})...", pid),
            Message::WatcherFailedToStopExisting(error) => format!("Failed to stop existing watcher: {}", error),
            Message::WatcherReceivedSigterm => "Received SIGTERM, shutting down gracefully...".to_string(),
            Message::WatcherReceivedSigint => "Received SIGINT, shutting down gracefully...".to_string(),
            Message::WatcherReceivedCtrlC => "Received Ctrl+C, shutting down gracefully...".to_string(),
            Message::WatcherCtrlCListenFailed(error) => format!("Failed to listen for Ctrl+C: {}", error),
            Message::WatcherSignalHandlingNotSupported => "Signal handling not supported on this platform".to_string(),
            Message::DaemonModeNotSupported => "Background mode is not supported on this platform, use --foreground".to_string(),
            Message::InvalidPidFileContent => "Invalid PID file content".to_string(),
            Message::FailedToOpenProcess(code) => format!("Failed to open process (error {})", code),
            Message::FailedToTerminateProcess(code) => format!("Failed to terminate process (error {})", code),
            Message::ProcessTerminationNotSupported => "Process termination is not supported on this platform".to_string(),
            Message::FailedToCreateSigtermHandler => "Failed to create SIGTERM handler".to_string(),
            Message::FailedToCreateSigintHandler => "Failed to create SIGINT handler".to_string(),
            Message::FailedToGetCurrentExecutable => "Failed to locate the current executable".to_string(),

            // === PROMPTS ===
            Message::PromptSelectModules => "Select modules to configure (space to select, enter to confirm)".to_string(),
            Message::PromptContactName => "Name".to_string(),
            Message::PromptPhoneNumber => "Phone number (digits only)".to_string(),
            Message::PromptCountryCode => "Country code (e.g. 86)".to_string(),
            Message::PromptRelationship => "Relationship (optional)".to_string(),
            Message::PromptCheckInterval => "Alert after how many minutes without activity".to_string(),
            Message::InvalidCheckInterval => "Must be at least 1 minute".to_string(),
            Message::PromptInputEvents => "Treat keyboard and mouse input as activity?".to_string(),
            Message::PromptHighAccuracy => "Use high accuracy location?".to_string(),
            Message::PromptDistanceFilter => "Minimum movement between updates (meters)".to_string(),
            Message::PromptWatchInterval => "Update interval (ms)".to_string(),
            Message::PromptFastestInterval => "Fastest update interval (ms)".to_string(),
            Message::PromptFixedPosition => "Fixed position as 'latitude, longitude' (empty for none)".to_string(),
            Message::InvalidPosition => "Expected 'latitude, longitude' within valid ranges".to_string(),
        };

        write!(f, "{}", text)
    }
}
