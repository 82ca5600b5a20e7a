//! Synchronous state-change notifications.
//!
//! A thin broadcast: observers registered on the engine receive every
//! notification in registration order, on the same call stack as the
//! transition that caused it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A state-change event.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Notification {
    /// A state became true.
    StateSet(String),
    /// A state stopped being true.
    StateRemoved(String),
}

impl Notification {
    /// Full name of the state the event is about.
    pub fn state(&self) -> &str {
        match self {
            Self::StateSet(name) | Self::StateRemoved(name) => name,
        }
    }

    /// Whether this announces a state being set.
    pub fn is_set(&self) -> bool {
        matches!(self, Self::StateSet(_))
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StateSet(name) => write!(f, "setState({name})"),
            Self::StateRemoved(name) => write!(f, "removeState({name})"),
        }
    }
}

/// Callback receiving notifications.
pub type Observer = Box<dyn FnMut(&Notification)>;

/// Handle returned by [`Observers::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Registration-ordered observer list.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    entries: Vec<(ObserverId, Observer)>,
}

impl Observers {
    /// An empty observer list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer; it is called after those registered earlier.
    pub fn subscribe(&mut self, observer: Observer) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    /// Remove an observer, returning `true` if it was registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Call every observer in registration order.
    pub fn publish(&mut self, notification: &Notification) {
        for (_, observer) in &mut self.entries {
            observer(notification);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}
