#[cfg(test)]
mod tests {
    use livelife::db::contacts::{Contacts, STORAGE_KEY};
    use livelife::db::db::Db;
    use livelife::db::kv_store::KvStore;
    use livelife::libs::contact::{ContactUpdate, NewContact};
    use livelife::libs::error::AppError;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ContactsTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
    }

    impl TestContext for ContactsTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("livelife.db");
            ContactsTestContext { _temp_dir: temp_dir, db_path }
        }
    }

    impl ContactsTestContext {
        fn contacts(&self) -> Contacts {
            Contacts::open(&self.db_path).unwrap()
        }

        fn raw_store(&self) -> KvStore {
            KvStore::with_db(Db::open(&self.db_path).unwrap()).unwrap()
        }
    }

    #[test_context(ContactsTestContext)]
    #[test]
    fn test_contact_lifecycle(ctx: &mut ContactsTestContext) {
        let mut contacts = ctx.contacts();
        assert!(contacts.list_contacts().is_empty());

        let mom = contacts.add_contact(NewContact::new("Mom", "12345678", "86").with_relationship("mother")).unwrap();
        assert!(!mom.id.is_empty());
        assert!(mom.is_active);
        assert_eq!(mom.international_number(), "+86 12345678");

        let listed = contacts.list_contacts();
        assert_eq!(listed, vec![mom.clone()]);
        assert_eq!(contacts.active_contacts().len(), 1);

        let toggled = contacts.toggle_active(&mom.id).unwrap().unwrap();
        assert!(!toggled.is_active);
        assert!(toggled.last_updated >= mom.last_updated);
        assert!(contacts.active_contacts().is_empty());
        assert_eq!(contacts.list_contacts().len(), 1);

        let update = ContactUpdate {
            name: Some("Mum".to_string()),
            ..Default::default()
        };
        let updated = contacts.update_contact(&mom.id, update).unwrap().unwrap();
        assert_eq!(updated.name, "Mum");
        assert_eq!(updated.phone_number, "12345678");
        assert!(!updated.is_active);

        assert!(contacts.delete_contact(&mom.id).unwrap());
        assert!(contacts.list_contacts().is_empty());
    }

    #[test_context(ContactsTestContext)]
    #[test]
    fn test_contacts_survive_reopen(ctx: &mut ContactsTestContext) {
        let dad = {
            let mut contacts = ctx.contacts();
            contacts.add_contact(NewContact::new("Dad", "87654321", "+1")).unwrap()
        };
        assert_eq!(dad.country_code, "1");

        let contacts = ctx.contacts();
        assert_eq!(contacts.get_contact(&dad.id).unwrap(), Some(dad));
    }

    #[test_context(ContactsTestContext)]
    #[test]
    fn test_ids_are_unique_and_order_is_kept(ctx: &mut ContactsTestContext) {
        let mut contacts = ctx.contacts();
        let first = contacts.add_contact(NewContact::new("Anna", "111", "44")).unwrap();
        let second = contacts.add_contact(NewContact::new("Anna", "111", "44")).unwrap();
        assert_ne!(first.id, second.id);

        let ids: Vec<String> = contacts.list_contacts().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test_context(ContactsTestContext)]
    #[test]
    fn test_invalid_contact_is_not_stored(ctx: &mut ContactsTestContext) {
        let mut contacts = ctx.contacts();

        assert!(matches!(contacts.add_contact(NewContact::new("  ", "123", "86")), Err(AppError::InvalidContact(_))));
        assert!(matches!(contacts.add_contact(NewContact::new("Mom", "12-34", "86")), Err(AppError::InvalidContact(_))));
        assert!(contacts.list_contacts().is_empty());
    }

    #[test_context(ContactsTestContext)]
    #[test]
    fn test_unknown_id_is_not_an_error(ctx: &mut ContactsTestContext) {
        let mut contacts = ctx.contacts();
        contacts.add_contact(NewContact::new("Mom", "12345678", "86")).unwrap();

        assert_eq!(contacts.get_contact("missing").unwrap(), None);
        assert_eq!(contacts.toggle_active("missing").unwrap(), None);
        let update = ContactUpdate {
            name: Some("Nobody".to_string()),
            ..Default::default()
        };
        assert_eq!(contacts.update_contact("missing", update).unwrap(), None);
        assert!(!contacts.delete_contact("missing").unwrap());
        assert_eq!(contacts.list_contacts().len(), 1);
    }

    #[test_context(ContactsTestContext)]
    #[test]
    fn test_corrupt_storage_lists_empty_but_rejects_writes(ctx: &mut ContactsTestContext) {
        let mut store = ctx.raw_store();
        store.set_item(STORAGE_KEY, "{not json").unwrap();

        let mut contacts = ctx.contacts();
        assert!(contacts.list_contacts().is_empty());
        assert!(contacts.active_contacts().is_empty());
        assert!(matches!(contacts.add_contact(NewContact::new("Mom", "12345678", "86")), Err(AppError::Corrupt(_))));

        // the broken value is left for the user to recover
        assert_eq!(store.get_item(STORAGE_KEY).unwrap().as_deref(), Some("{not json"));
    }

    #[test_context(ContactsTestContext)]
    #[test]
    fn test_stored_format_uses_camel_case(ctx: &mut ContactsTestContext) {
        let mut contacts = ctx.contacts();
        contacts.add_contact(NewContact::new("Mom", "12345678", "86")).unwrap();

        let raw = ctx.raw_store().get_item(STORAGE_KEY).unwrap().unwrap();
        assert!(raw.contains("\"phoneNumber\":\"12345678\""));
        assert!(raw.contains("\"countryCode\":\"86\""));
        assert!(raw.contains("\"isActive\":true"));
        assert!(raw.contains("\"lastUpdated\""));
    }
}
