//! The `State` record: a named boolean condition, optionally scoped to a group.
//!
//! States are immutable once created. Their full name is the registry key and
//! the value written into the URL; their class name is what gets toggled on the
//! document body.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Group name reserved for device orientation states.
pub const ORIENTATION_GROUP: &str = "orientation";

/// A declared prototype state.
///
/// # Example
///
/// ```rust
/// use clickthrough::core::State;
///
/// let state = State::new("login-filled", Some("screen"));
/// assert_eq!(state.full_name(), "screen:login-filled");
/// assert_eq!(state.class_name(), "screen-login-filled");
///
/// let ungrouped = State::new("menu", None);
/// assert_eq!(ungrouped.full_name(), "menu");
/// assert!(ungrouped.group().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    name: String,
    group: Option<String>,
    class_name: String,
    full_name: String,
}

impl State {
    /// Create a state, deriving its class and full names.
    pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
        let name = name.into();
        Self {
            class_name: join_name('-', &name, group),
            full_name: join_name(':', &name, group),
            group: group.map(str::to_string),
            name,
        }
    }

    /// Bare state name, without its group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Group the state is exclusive within, if any.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Class toggled on the document body while the state is active.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Unique registry key, `group:name` or bare `name`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Class a layer carries to be shown while this state is active.
    pub fn visible_class(&self, suffix: &str) -> String {
        format!("{}{}", self.class_name, suffix)
    }

    /// Whether this state lives in the orientation pseudo-group.
    pub fn is_orientation(&self) -> bool {
        self.group.as_deref() == Some(ORIENTATION_GROUP)
    }

    /// Whether two states compete for the same exclusive group.
    ///
    /// Ungrouped states never share a group.
    pub fn shares_group_with(&self, other: &State) -> bool {
        matches!((&self.group, &other.group), (Some(a), Some(b)) if a == b)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// Join a state name with its group using the given separator.
pub(crate) fn join_name(separator: char, name: &str, group: Option<&str>) -> String {
    match group {
        Some(group) => format!("{group}{separator}{name}"),
        None => name.to_string(),
    }
}
