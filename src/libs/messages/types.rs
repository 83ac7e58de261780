/// Every user-facing message of the CLI. Text lives in `display.rs`.
#[derive(Debug, Clone)]
pub enum Message {
    // === CONTACT MESSAGES ===
    ContactCreated(String),
    ContactUpdated(String),
    ContactDeleted(String),
    ContactNotFound(String), // id
    ContactActivated(String),
    ContactDeactivated(String),
    ContactSaveFailed,
    ContactsHeader,
    InvalidContact(String), // reason
    NoContacts,
    NoChangesProvided,
    ConfirmDeleteContact(String),
    SelectContactToEdit,
    SelectContactToDelete,
    SelectContactToToggle,
    OperationCancelled,

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigFileNotFound,
    ConfigModuleMonitor,
    ConfigModuleLocation,

    // === MONITOR MESSAGES ===
    MonitorStarted { check_interval_minutes: u64 },
    MonitorShuttingDown,
    InactivityDetected(String), // last active time
    PermissionsRequired,
    LocationUnavailable(String),

    // === WATCHER MESSAGES ===
    WatcherStarted(u32),
    WatcherStopped(u32),
    WatcherNotRunning,
    WatcherNotRunningPidNotFound,
    WatcherStoppingExisting(String),
    WatcherFailedToStopExisting(String),
    WatcherReceivedSigterm,
    WatcherReceivedSigint,
    WatcherReceivedCtrlC,
    WatcherCtrlCListenFailed(String),
    WatcherSignalHandlingNotSupported,
    DaemonModeNotSupported,
    InvalidPidFileContent,
    FailedToOpenProcess(u32),
    FailedToTerminateProcess(u32),
    ProcessTerminationNotSupported,
    FailedToCreateSigtermHandler,
    FailedToCreateSigintHandler,
    FailedToGetCurrentExecutable,

    // === PROMPTS ===
    PromptSelectModules,
    PromptContactName,
    PromptPhoneNumber,
    PromptCountryCode,
    PromptRelationship,
    PromptCheckInterval,
    InvalidCheckInterval,
    PromptInputEvents,
    PromptHighAccuracy,
    PromptDistanceFilter,
    PromptWatchInterval,
    PromptFastestInterval,
    PromptFixedPosition,
    InvalidPosition,
}
