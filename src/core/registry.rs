//! State registry and the active-state set.
//!
//! The registry is pure bookkeeping: it knows which states exist and which are
//! active, and answers exclusivity questions. Rendering, history and
//! notifications are layered on top by the engine.

use super::state::State;
use crate::engine::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The set of currently-true state full names, in activation order.
///
/// Orientation is tracked separately and never appears here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveStateSet {
    states: Vec<String>,
}

impl ActiveStateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `full_name` is in the set.
    pub fn contains(&self, full_name: &str) -> bool {
        self.states.iter().any(|s| s == full_name)
    }

    /// Add a state, returning `false` if it was already present.
    pub fn insert(&mut self, full_name: &str) -> bool {
        if self.contains(full_name) {
            return false;
        }
        self.states.push(full_name.to_string());
        true
    }

    /// Remove a state, returning `true` if it was present.
    pub fn remove(&mut self, full_name: &str) -> bool {
        let before = self.states.len();
        self.states.retain(|s| s != full_name);
        self.states.len() != before
    }

    /// Active full names in activation order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Owned copy of the active full names.
    pub fn to_vec(&self) -> Vec<String> {
        self.states.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for ActiveStateSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ActiveStateSet::new();
        for state in iter {
            let state: String = state.into();
            set.insert(&state);
        }
        set
    }
}

/// Every declared state plus the active set.
///
/// # Example
///
/// ```rust
/// use clickthrough::core::StateRegistry;
///
/// let mut registry = StateRegistry::new();
/// registry.register("welcome", Some("screen")).unwrap();
/// registry.register("login", Some("screen")).unwrap();
///
/// assert!(registry.contains("screen:login"));
/// assert!(registry.register("login", Some("screen")).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct StateRegistry {
    states: Vec<State>,
    index: HashMap<String, usize>,
    active: ActiveStateSet,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a state. Fails if its full name is already registered.
    pub fn register(&mut self, name: &str, group: Option<&str>) -> Result<&State, EngineError> {
        let state = State::new(name, group);
        if self.index.contains_key(state.full_name()) {
            return Err(EngineError::DuplicateStateRegistration {
                full_name: state.full_name().to_string(),
            });
        }
        let position = self.states.len();
        self.index.insert(state.full_name().to_string(), position);
        self.states.push(state);
        Ok(&self.states[position])
    }

    /// Whether a state with this full name is registered.
    pub fn contains(&self, full_name: &str) -> bool {
        self.index.contains_key(full_name)
    }

    /// Look up a registered state.
    pub fn get(&self, full_name: &str) -> Option<&State> {
        self.index.get(full_name).map(|&i| &self.states[i])
    }

    /// Look up a state, failing with `InvalidState` when unknown.
    pub fn require(&self, full_name: &str) -> Result<&State, EngineError> {
        self.get(full_name).ok_or_else(|| EngineError::InvalidState {
            name: full_name.to_string(),
        })
    }

    /// Declared states, in registration order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The currently active states.
    pub fn active(&self) -> &ActiveStateSet {
        &self.active
    }

    /// Whether a registered state is active.
    pub fn is_active(&self, full_name: &str) -> bool {
        self.active.contains(full_name)
    }

    /// Active states that must give way before `state` can be activated.
    ///
    /// Includes `state` itself when it is already active. Empty for ungrouped
    /// states.
    pub fn exclusive_conflicts(&self, state: &State) -> Vec<String> {
        self.active
            .iter()
            .filter(|name| {
                self.get(name)
                    .is_some_and(|active| active.shares_group_with(state))
            })
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn activate(&mut self, full_name: &str) -> bool {
        self.active.insert(full_name)
    }

    pub(crate) fn deactivate(&mut self, full_name: &str) -> bool {
        self.active.remove(full_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> StateRegistry {
        let mut registry = StateRegistry::new();
        registry.register("welcome", Some("screen")).unwrap();
        registry.register("login", Some("screen")).unwrap();
        registry.register("menu", None).unwrap();
        registry.register("badge", None).unwrap();
        registry
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut registry = registry();
        let result = registry.register("login", Some("screen"));

        assert!(matches!(
            result,
            Err(EngineError::DuplicateStateRegistration { ref full_name }) if full_name == "screen:login"
        ));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn same_name_in_different_groups_is_allowed() {
        let mut registry = registry();
        assert!(registry.register("login", Some("modal")).is_ok());
        assert!(registry.register("login", None).is_ok());
    }

    #[test]
    fn require_reports_invalid_state() {
        let registry = registry();
        assert!(registry.require("screen:welcome").is_ok());
        assert!(matches!(
            registry.require("screen:missing"),
            Err(EngineError::InvalidState { .. })
        ));
    }

    #[test]
    fn conflicts_are_limited_to_the_same_group() {
        let mut registry = registry();
        registry.activate("screen:welcome");
        registry.activate("menu");

        let login = registry.get("screen:login").unwrap().clone();
        assert_eq!(registry.exclusive_conflicts(&login), vec!["screen:welcome"]);

        let badge = registry.get("badge").unwrap().clone();
        assert!(registry.exclusive_conflicts(&badge).is_empty());
    }

    #[test]
    fn active_set_keeps_activation_order() {
        let mut set = ActiveStateSet::new();
        assert!(set.insert("b"));
        assert!(set.insert("a"));
        assert!(!set.insert("b"));

        assert_eq!(set.to_vec(), vec!["b", "a"]);
        assert!(set.remove("b"));
        assert!(!set.remove("b"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn active_set_serializes_as_list() {
        let set: ActiveStateSet = ["screen:home", "menu"].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["screen:home","menu"]"#);

        let back: ActiveStateSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
