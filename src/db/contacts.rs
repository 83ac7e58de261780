//! Emergency contact store.
//!
//! The whole list is kept as one JSON array under [`STORAGE_KEY`] in the
//! key-value area, and every mutation rewrites it.
//!
//! ## Failure policy
//!
//! - `list_contacts` / `active_contacts` log a storage or decoding failure and
//!   return an empty list, so a listing view never crashes.
//! - Mutations log the failure and return it to the caller.
//! - Unknown ids are not errors: update and toggle return `None`, delete
//!   returns `false`.

use super::db::Db;
use super::kv_store::KvStore;
use crate::libs::contact::{Contact, ContactUpdate, NewContact};
use crate::libs::error::AppResult;
use std::path::Path;
use tracing::{debug, error};

pub const STORAGE_KEY: &str = "@emergency_contacts";

pub struct Contacts {
    store: KvStore,
}

impl Contacts {
    pub fn new() -> AppResult<Contacts> {
        Ok(Contacts { store: KvStore::new()? })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> AppResult<Contacts> {
        Ok(Contacts {
            store: KvStore::with_db(Db::open(path)?)?,
        })
    }

    pub fn list_contacts(&self) -> Vec<Contact> {
        self.load().unwrap_or_else(|e| {
            error!(error = %e, "failed to load contacts");
            Vec::new()
        })
    }

    /// Contacts that should be alerted.
    pub fn active_contacts(&self) -> Vec<Contact> {
        self.list_contacts().into_iter().filter(|contact| contact.is_active).collect()
    }

    pub fn get_contact(&self, id: &str) -> AppResult<Option<Contact>> {
        let contacts = self.load().inspect_err(|e| error!(error = %e, id, "failed to load contact"))?;
        Ok(contacts.into_iter().find(|contact| contact.id == id))
    }

    pub fn add_contact(&mut self, params: NewContact) -> AppResult<Contact> {
        let params = params.validated()?;
        let mut contacts = self.load().inspect_err(|e| error!(error = %e, "failed to add contact"))?;
        let contact = Contact::new(params);
        contacts.push(contact.clone());
        self.save(&contacts).inspect_err(|e| error!(error = %e, "failed to add contact"))?;
        debug!(id = %contact.id, "contact added");
        Ok(contact)
    }

    pub fn update_contact(&mut self, id: &str, update: ContactUpdate) -> AppResult<Option<Contact>> {
        let update = update.validated()?;
        self.modify(id, "update", |contact| contact.apply(update))
    }

    /// Returns `false` when no contact has this id.
    pub fn delete_contact(&mut self, id: &str) -> AppResult<bool> {
        let mut contacts = self.load().inspect_err(|e| error!(error = %e, id, "failed to delete contact"))?;
        let before = contacts.len();
        contacts.retain(|contact| contact.id != id);
        if contacts.len() == before {
            return Ok(false);
        }
        self.save(&contacts).inspect_err(|e| error!(error = %e, id, "failed to delete contact"))?;
        debug!(id, "contact deleted");
        Ok(true)
    }

    pub fn toggle_active(&mut self, id: &str) -> AppResult<Option<Contact>> {
        self.modify(id, "toggle", |contact| {
            let is_active = !contact.is_active;
            contact.apply(ContactUpdate {
                is_active: Some(is_active),
                ..Default::default()
            })
        })
    }

    fn modify<F>(&mut self, id: &str, operation: &str, change: F) -> AppResult<Option<Contact>>
    where
        F: FnOnce(&mut Contact),
    {
        let mut contacts = self.load().inspect_err(|e| error!(error = %e, id, operation, "failed to modify contact"))?;
        let Some(contact) = contacts.iter_mut().find(|contact| contact.id == id) else {
            return Ok(None);
        };
        change(contact);
        let updated = contact.clone();
        self.save(&contacts).inspect_err(|e| error!(error = %e, id, operation, "failed to modify contact"))?;
        debug!(id, operation, "contact modified");
        Ok(Some(updated))
    }

    fn load(&self) -> AppResult<Vec<Contact>> {
        match self.store.get_item(STORAGE_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, contacts: &[Contact]) -> AppResult<()> {
        let json = serde_json::to_string(contacts)?;
        self.store.set_item(STORAGE_KEY, &json)
    }
}
