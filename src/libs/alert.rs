//! What happens when the monitor decides the user has gone quiet.
//!
//! The monitor calls an [`InactivityHandler`]. The default one only logs;
//! [`ContactAlertHandler`] turns the trigger into one [`EmergencyAlert`] per
//! active contact and hands each to an [`AlertNotifier`]. How an alert is
//! actually delivered (SMS, push, call) is up to the host's notifier.

use crate::db::contacts::Contacts;
use crate::libs::contact::Contact;
use crate::libs::location::{LocationData, LocationTracker};
use crate::libs::monitor::ActivityStatus;
use anyhow::{bail, Result};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

pub trait InactivityHandler: Send + Sync {
    fn on_inactivity(&self, status: &ActivityStatus) -> Result<()>;
}

impl<F> InactivityHandler for F
where
    F: Fn(&ActivityStatus) -> Result<()> + Send + Sync,
{
    fn on_inactivity(&self, status: &ActivityStatus) -> Result<()> {
        self(status)
    }
}

/// Logs the trigger and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogInactivityHandler;

impl InactivityHandler for LogInactivityHandler {
    fn on_inactivity(&self, status: &ActivityStatus) -> Result<()> {
        warn!(last_active = %status.last_active_time, "user inactive, emergency notification would be triggered");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyAlert {
    pub contact: Contact,
    pub last_active_time: DateTime<Local>,
    pub location: Option<LocationData>,
}

impl EmergencyAlert {
    /// Text body suitable for an SMS.
    pub fn message(&self) -> String {
        let mut text = format!(
            "LiveLife alert: no activity since {}. Please check on them.",
            self.last_active_time.format("%Y-%m-%d %H:%M")
        );
        if let Some(location) = &self.location {
            text.push_str(&format!(" Last known location: {:.5}, {:.5}", location.latitude, location.longitude));
        }
        text
    }
}

pub trait AlertNotifier: Send + Sync {
    fn notify(&self, alert: &EmergencyAlert) -> Result<()>;
}

/// Notifier that records what would be sent in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl AlertNotifier for LogNotifier {
    fn notify(&self, alert: &EmergencyAlert) -> Result<()> {
        info!(contact = %alert.contact.name, number = %alert.contact.international_number(), message = %alert.message(), "emergency alert");
        Ok(())
    }
}

pub struct ContactAlertHandler<N> {
    contacts: Mutex<Contacts>,
    notifier: N,
    location: Option<Arc<LocationTracker>>,
}

impl<N: AlertNotifier> ContactAlertHandler<N> {
    pub fn new(contacts: Contacts, notifier: N) -> Self {
        Self {
            contacts: Mutex::new(contacts),
            notifier,
            location: None,
        }
    }

    /// Attach the last known position to every alert.
    pub fn with_location(mut self, tracker: Arc<LocationTracker>) -> Self {
        self.location = Some(tracker);
        self
    }
}

impl<N: AlertNotifier> InactivityHandler for ContactAlertHandler<N> {
    fn on_inactivity(&self, status: &ActivityStatus) -> Result<()> {
        let recipients = self.contacts.lock().active_contacts();
        if recipients.is_empty() {
            warn!("user inactive but there are no active emergency contacts");
            return Ok(());
        }

        let location = self.location.as_ref().and_then(|tracker| tracker.last_known_location());
        let mut failed = Vec::new();
        for contact in recipients {
            let alert = EmergencyAlert {
                contact,
                last_active_time: status.last_active_time,
                location,
            };
            if let Err(e) = self.notifier.notify(&alert) {
                warn!(contact = %alert.contact.name, error = %e, "failed to notify emergency contact");
                failed.push(alert.contact.name);
            }
        }

        if !failed.is_empty() {
            bail!("failed to notify {} contact(s): {}", failed.len(), failed.join(", "));
        }
        Ok(())
    }
}
