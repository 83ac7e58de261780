//! Error types shared by the library services.
//!
//! Services return [`AppError`] so that callers can tell a refused permission
//! from a broken storage layer. The CLI layer converts these into `anyhow`
//! errors and user-facing messages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The user or the platform refused a permission the operation needs.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The local persistence layer failed to read or write.
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Stored data could not be decoded, or encoding a value failed.
    #[error("stored data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The location provider failed a one-shot fix or a watch.
    #[error("location provider error: {0}")]
    Provider(String),

    #[error("check interval must be a positive number of milliseconds, got {0}")]
    InvalidInterval(u64),

    #[error("invalid contact: {0}")]
    InvalidContact(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
