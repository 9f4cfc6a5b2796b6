//! Observation of resolver activity.
//!
//! Events are purely informational: a resolver behaves identically whether or
//! not anything is observing it.

use crate::{record::Key, resolver::Method};
use std::{fmt, sync::Arc};

/// Something that happened while resolving names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A protocol produced a key for a name.
    Resolved {
        /// Protocol that produced the key.
        method: Method,
        /// Normalized name that was resolved.
        name: String,
        /// Key the name resolved to.
        key: Key,
    },
    /// A protocol failed to produce a key, or produced a record with a
    /// tolerated defect.
    Failed {
        /// Protocol that failed.
        method: Method,
        /// Normalized name being resolved.
        name: String,
        /// Description of the failure.
        err: String,
    },
    /// The in-memory cache was flushed.
    CacheFlushed,
}

/// Receives [`Event`]s from a resolver.
///
/// Implemented for any `Fn(&Event) + Send + Sync`.
pub trait Observer: Send + Sync {
    /// Called synchronously each time an event occurs.
    fn notify(&self, event: &Event);
}

impl<F> Observer for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn notify(&self, event: &Event) {
        self(event)
    }
}

/// Set of observers notified of a resolver's events.
#[derive(Clone, Default)]
pub struct Events {
    observers: Vec<Arc<dyn Observer>>,
}

impl Events {
    /// Adds an observer.
    pub fn subscribe(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Notifies every observer of an event.
    pub fn emit(&self, event: Event) {
        for observer in &self.observers {
            observer.notify(&event);
        }
    }
}

impl fmt::Debug for Events {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Events")
            .field("observers", &self.observers.len())
            .finish()
    }
}
