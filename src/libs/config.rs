//! Configuration management for livelife.
//!
//! Settings are stored as pretty-printed JSON in the platform data directory
//! (see [`DataStorage`]). Every section is optional so a fresh install runs on
//! defaults and `livelife init` only writes what the user configured.
//!
//! ## Sections
//!
//! - **Monitor**: inactivity window and whether desktop input is watched
//! - **Location**: watch tuning and an optional fixed position for hosts
//!   without a location service
//!
//! ## Usage
//!
//! ```rust,no_run
//! use livelife::libs::config::{Config, MonitorConfig};
//!
//! let mut config = Config::read()?;
//! config.monitor = Some(MonitorConfig { check_interval: 60_000, ..Default::default() });
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::location::{Accuracy, WatchOptions};
use crate::libs::messages::Message;
use crate::libs::monitor::DEFAULT_CHECK_INTERVAL_MS;
use crate::{msg_error_anyhow, msg_print};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// A section offered by the setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// Activity monitor settings. Missing fields take their defaults.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Inactivity window in milliseconds. It is both the check period and
    /// the threshold: no activity for a whole window triggers the alert.
    pub check_interval: u64,

    /// Watch global keyboard and mouse input as activity (desktop hosts).
    pub input_events: bool,
}

impl Default for MonitorConfig {
    /// 30 minute window, desktop input watched.
    fn default() -> Self {
        MonitorConfig {
            check_interval: DEFAULT_CHECK_INTERVAL_MS,
            input_events: true,
        }
    }
}

/// Location settings. Missing fields take their defaults.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LocationConfig {
    pub high_accuracy: bool,
    /// Minimum movement in meters between watch updates.
    pub distance_filter: f64,
    /// Preferred milliseconds between watch updates.
    pub interval: u64,
    /// Milliseconds below which updates are never delivered.
    pub fastest_interval: u64,
    /// Fixed position reported when the host has no location service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        let watch = WatchOptions::default();
        LocationConfig {
            high_accuracy: watch.accuracy == Accuracy::High,
            distance_filter: watch.min_distance_meters,
            interval: watch.min_interval_ms,
            fastest_interval: watch.fastest_interval_ms,
            latitude: None,
            longitude: None,
        }
    }
}

impl LocationConfig {
    pub fn fixed_position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

impl From<&LocationConfig> for WatchOptions {
    fn from(config: &LocationConfig) -> Self {
        WatchOptions {
            accuracy: if config.high_accuracy { Accuracy::High } else { Accuracy::Balanced },
            min_distance_meters: config.distance_filter,
            min_interval_ms: config.interval,
            fastest_interval_ms: config.fastest_interval,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor: Option<MonitorConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationConfig>,
}

impl Config {
    /// Loads the configuration, or defaults when no file exists yet.
    ///
    /// A file that exists but cannot be parsed is an error.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        Self::read_from(&config_file_path)
    }

    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        self.save_to(&config_file_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Interactive setup wizard, prefilled with the current values.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            ConfigModule {
                key: "monitor".to_string(),
                name: "Monitor".to_string(),
            },
            ConfigModule {
                key: "location".to_string(),
                name: "Location".to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "monitor" => {
                    let default = config.monitor.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleMonitor);
                    let minutes: u64 = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptCheckInterval.to_string())
                        .default((default.check_interval / 60_000).max(1))
                        .validate_with(|value: &u64| match minutes_to_ms(*value) {
                            Some(_) => Ok(()),
                            None => Err(Message::InvalidCheckInterval.to_string()),
                        })
                        .interact_text()?;
                    config.monitor = Some(MonitorConfig {
                        check_interval: minutes_to_ms(minutes).ok_or_else(|| msg_error_anyhow!(Message::InvalidCheckInterval))?,
                        input_events: Confirm::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptInputEvents.to_string())
                            .default(default.input_events)
                            .interact()?,
                    });
                }
                "location" => {
                    let default = config.location.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleLocation);
                    let high_accuracy = Confirm::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptHighAccuracy.to_string())
                        .default(default.high_accuracy)
                        .interact()?;
                    let distance_filter = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptDistanceFilter.to_string())
                        .default(default.distance_filter)
                        .interact_text()?;
                    let interval = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptWatchInterval.to_string())
                        .default(default.interval)
                        .interact_text()?;
                    let fastest_interval = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptFastestInterval.to_string())
                        .default(default.fastest_interval)
                        .interact_text()?;
                    // Empty answer keeps the host's own location service.
                    let position: String = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptFixedPosition.to_string())
                        .default(default.fixed_position().map(|(lat, lon)| format!("{}, {}", lat, lon)).unwrap_or_default())
                        .allow_empty(true)
                        .validate_with(|value: &String| parse_position(value).map(|_| ()).ok_or_else(|| Message::InvalidPosition.to_string()))
                        .interact_text()?;
                    let position = parse_position(&position).flatten();
                    config.location = Some(LocationConfig {
                        high_accuracy,
                        distance_filter,
                        interval,
                        fastest_interval,
                        latitude: position.map(|(lat, _)| lat),
                        longitude: position.map(|(_, lon)| lon),
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }
}

/// Parses `"lat, lon"`. `Some(None)` means blank, `None` means malformed.
fn parse_position(value: &str) -> Option<Option<(f64, f64)>> {
    let value = value.trim();
    if value.is_empty() {
        return Some(None);
    }
    let (lat, lon) = value.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    Some(Some((lat, lon)))
}

/// Wizard minutes to a check interval, rejecting zero and overflow.
fn minutes_to_ms(minutes: u64) -> Option<u64> {
    minutes.checked_mul(60_000).filter(|ms| *ms > 0)
}
