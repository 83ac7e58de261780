//! Core library modules for livelife.
//!
//! - **Activity monitoring**: [`monitor`], [`sources`], [`listeners`]
//! - **Alerting**: [`alert`], [`contact`], [`location`], [`permission`]
//! - **Infrastructure**: configuration, data storage, errors, messages
//! - **Host**: the background watcher in [`daemon`] and console [`view`]s

pub mod alert;
pub mod config;
pub mod contact;
pub mod daemon;
pub mod data_storage;
pub mod error;
pub mod listeners;
pub mod location;
pub mod messages;
pub mod monitor;
pub mod permission;
pub mod sources;
pub mod view;
