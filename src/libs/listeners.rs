//! Ordered observer registry with handle-based removal.
//!
//! Used by the activity monitor and the location tracker. Registration order
//! is notification order, and the same callback may be registered twice.
//! Callers take a [`Listeners::snapshot`] under their own lock and invoke the
//! callbacks after releasing it, so a callback may re-enter its owner.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

/// Handle returned by `add`, passed back to `remove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub struct Listeners<T> {
    entries: Vec<(ListenerId, Listener<T>)>,
    next_id: u64,
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new(), next_id: 1 }
    }

    pub fn add<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Arc::new(callback)));
        id
    }

    /// Removes the listener registered under `id`. Unknown ids are ignored.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        match self.entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Vec<Listener<T>> {
        self.entries.iter().map(|(_, listener)| Arc::clone(listener)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Invokes every listener in order with the same value.
///
/// A panicking listener is logged and skipped; the rest are still called.
pub fn notify_all<T>(listeners: &[Listener<T>], value: &T) {
    for listener in listeners {
        if catch_unwind(AssertUnwindSafe(|| listener(value))).is_err() {
            warn!("activity listener panicked");
        }
    }
}
