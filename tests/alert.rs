#[cfg(test)]
mod tests {
    use chrono::Local;
    use livelife::db::contacts::Contacts;
    use livelife::libs::alert::{AlertNotifier, ContactAlertHandler, EmergencyAlert, InactivityHandler};
    use livelife::libs::contact::NewContact;
    use livelife::libs::location::{LocationTracker, StaticLocationProvider};
    use livelife::libs::monitor::ActivityStatus;
    use livelife::libs::permission::StaticPermissionGate;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    /// Records alerts and fails for the contacts named in `failing`.
    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<EmergencyAlert>>>,
        failing: Vec<String>,
    }

    impl AlertNotifier for RecordingNotifier {
        fn notify(&self, alert: &EmergencyAlert) -> anyhow::Result<()> {
            if self.failing.contains(&alert.contact.name) {
                anyhow::bail!("delivery to {} failed", alert.contact.name);
            }
            self.sent.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    /// Two active contacts and one disabled one.
    struct AlertTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
    }

    impl TestContext for AlertTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("livelife.db");
            let mut contacts = Contacts::open(&db_path).unwrap();
            contacts.add_contact(NewContact::new("Mom", "12345678", "86")).unwrap();
            contacts.add_contact(NewContact::new("Dad", "87654321", "86")).unwrap();
            let neighbour = contacts.add_contact(NewContact::new("Neighbour", "5550100", "1")).unwrap();
            contacts.toggle_active(&neighbour.id).unwrap();
            AlertTestContext { _temp_dir: temp_dir, db_path }
        }
    }

    impl AlertTestContext {
        fn contacts(&self) -> Contacts {
            Contacts::open(&self.db_path).unwrap()
        }
    }

    fn inactive_status() -> ActivityStatus {
        ActivityStatus {
            last_active_time: Local::now(),
            is_active: false,
        }
    }

    #[test_context(AlertTestContext)]
    #[test]
    fn test_only_active_contacts_are_alerted(ctx: &mut AlertTestContext) {
        let notifier = RecordingNotifier::default();
        let handler = ContactAlertHandler::new(ctx.contacts(), notifier.clone());

        handler.on_inactivity(&inactive_status()).unwrap();

        let names: Vec<String> = notifier.sent.lock().unwrap().iter().map(|a| a.contact.name.clone()).collect();
        assert_eq!(names, vec!["Mom", "Dad"]);
    }

    #[test_context(AlertTestContext)]
    #[test]
    fn test_failures_are_reported_after_every_attempt(ctx: &mut AlertTestContext) {
        let notifier = RecordingNotifier {
            failing: vec!["Mom".to_string()],
            ..Default::default()
        };
        let handler = ContactAlertHandler::new(ctx.contacts(), notifier.clone());

        let error = handler.on_inactivity(&inactive_status()).unwrap_err();
        assert!(error.to_string().contains("Mom"));
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[test_context(AlertTestContext)]
    #[test]
    fn test_alert_carries_last_known_location(ctx: &mut AlertTestContext) {
        let tracker = LocationTracker::new(Arc::new(StaticLocationProvider::new(31.23, 121.47)), Arc::new(StaticPermissionGate::granted()));
        tracker.start_tracking().unwrap();

        let notifier = RecordingNotifier::default();
        let handler = ContactAlertHandler::new(ctx.contacts(), notifier.clone()).with_location(Arc::new(tracker));
        handler.on_inactivity(&inactive_status()).unwrap();

        let sent = notifier.sent.lock().unwrap();
        let location = sent[0].location.unwrap();
        assert_eq!((location.latitude, location.longitude), (31.23, 121.47));
        assert!(sent[0].message().contains("31.23000, 121.47000"));
    }

    #[test]
    fn test_no_contacts_is_not_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let contacts = Contacts::open(temp_dir.path().join("livelife.db")).unwrap();
        let notifier = RecordingNotifier::default();
        let handler = ContactAlertHandler::new(contacts, notifier.clone());

        handler.on_inactivity(&inactive_status()).unwrap();
        assert!(notifier.sent.lock().unwrap().is_empty());
    }
}
