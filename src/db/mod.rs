//! Local persistence for livelife.
//!
//! Everything lives in one SQLite file in the application data directory.
//! [`kv_store`] provides a string key-value area and [`contacts`] keeps the
//! emergency contact list in it as a single JSON document.
//!
//! ```rust,no_run
//! use livelife::db::contacts::Contacts;
//! use livelife::libs::contact::NewContact;
//!
//! let mut contacts = Contacts::new()?;
//! let mom = contacts.add_contact(NewContact::new("Mom", "12345678", "86"))?;
//! contacts.toggle_active(&mom.id)?;
//! # Ok::<(), livelife::libs::error::AppError>(())
//! ```

pub mod contacts;
pub mod db;
pub mod kv_store;
