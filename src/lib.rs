//! # LiveLife
//!
//! Personal safety watcher. It notices when the user has shown no sign of
//! activity for a configured period and alerts their emergency contacts.
//!
//! ## Features
//!
//! - **Activity Monitoring**: touch, app foreground, screen unlock and desktop
//!   input all count as activity
//! - **Emergency Contacts**: stored locally, each can be enabled or disabled
//! - **Location**: the last known position is attached to alerts
//!
//! ## Usage
//!
//! ```rust,no_run
//! use livelife::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
