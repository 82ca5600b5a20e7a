//! The nested default-state tree handed to engine initialization.
//!
//! Leaves are booleans (a state, `true` meaning initially active); every other
//! key names a group. Nesting may go arbitrarily deep, but a leaf always
//! belongs to the outermost key it sits under.
//!
//! Trees are validated as a whole before any state is registered. Validation
//! accumulates every violation with `stillwater::Validation` so an author sees
//! all mistakes in one pass.

use super::state::{join_name, ORIENTATION_GROUP};
use crate::core::Orientation;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;
use tracing::warn;

/// Characters that would break the URL list format or CSS class selectors.
const RESERVED_CHARACTERS: &[char] = &[',', ':', '.', '?', '#', '&', '/'];

/// A single problem found while validating a state tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeViolation {
    #[error("State tree root must be an object")]
    RootNotObject,

    #[error("Empty state or group name under '{path}'")]
    EmptyName { path: String },

    #[error("Name '{name}' contains reserved character {character:?}")]
    ReservedCharacter { name: String, character: char },

    #[error("State '{full_name}' is declared more than once")]
    Duplicate { full_name: String },

    #[error("Unknown orientation state '{name}' (expected portrait or landscape)")]
    UnknownOrientation { name: String },

    #[error("States '{first}' and '{second}' share the class '{class_name}'")]
    ClassCollision {
        first: String,
        second: String,
        class_name: String,
    },

    #[error("'{name}' is reserved for the orientation group and cannot be a state")]
    ReservedGroup { name: String },
}

/// A node of the state tree.
#[derive(Clone, Debug, PartialEq)]
pub enum StateNode {
    /// A state, `true` when initially active.
    Leaf(bool),
    /// A group of nested nodes.
    Branch(StateTree),
}

/// A flattened leaf: one state to register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeLeaf {
    pub name: String,
    pub group: Option<String>,
    pub active: bool,
}

impl TreeLeaf {
    /// Registry key for this leaf.
    pub fn full_name(&self) -> String {
        join_name(':', &self.name, self.group.as_deref())
    }
}

/// Ordered mapping of keys to nodes.
///
/// # Example
///
/// ```rust
/// use clickthrough::core::{StateNode, StateTree};
///
/// let tree = StateTree::new()
///     .with("screen", StateNode::Branch(
///         StateTree::new()
///             .with("welcome", StateNode::Leaf(true))
///             .with("login", StateNode::Leaf(false)),
///     ))
///     .with("menu", StateNode::Leaf(false));
///
/// let names: Vec<String> = tree.leaves().iter().map(|l| l.full_name()).collect();
/// assert_eq!(names, vec!["screen:welcome", "screen:login", "menu"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateTree {
    entries: Vec<(String, StateNode)>,
}

impl StateTree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, replacing an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, node: StateNode) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = node,
            None => self.entries.push((key, node)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, node: StateNode) -> Self {
        self.insert(key, node);
        self
    }

    /// Whether `key` is declared at this level.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries at this level, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &StateNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Make sure the tree declares both orientation states.
    ///
    /// A missing orientation group is prepended, inactive. A partially
    /// declared group keeps the author's leaves and gains the missing ones.
    pub fn with_orientation_defaults(mut self) -> Self {
        let position = self
            .entries
            .iter()
            .position(|(key, _)| key == ORIENTATION_GROUP);
        match position {
            Some(i) => {
                if let StateNode::Branch(group) = &mut self.entries[i].1 {
                    for orientation in [Orientation::Portrait, Orientation::Landscape] {
                        if !group.contains_key(orientation.name()) {
                            group.insert(orientation.name(), StateNode::Leaf(false));
                        }
                    }
                }
            }
            None => {
                let orientation = StateTree::new()
                    .with(Orientation::Portrait.name(), StateNode::Leaf(false))
                    .with(Orientation::Landscape.name(), StateNode::Leaf(false));
                self.entries
                    .insert(0, (ORIENTATION_GROUP.to_string(), StateNode::Branch(orientation)));
            }
        }
        self
    }

    /// Flatten the tree into leaves, in declaration order.
    pub fn leaves(&self) -> Vec<TreeLeaf> {
        let mut leaves = Vec::new();
        self.collect_leaves(None, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, group: Option<&str>, out: &mut Vec<TreeLeaf>) {
        for (key, node) in &self.entries {
            match node {
                StateNode::Leaf(active) => out.push(TreeLeaf {
                    name: key.clone(),
                    group: group.map(str::to_string),
                    active: *active,
                }),
                StateNode::Branch(inner) => inner.collect_leaves(Some(group.unwrap_or(key)), out),
            }
        }
    }

    /// Build a tree from JSON. Non-boolean scalars are skipped.
    pub fn from_json(value: &Value) -> Result<Self, TreeViolation> {
        match value {
            Value::Object(_) => Ok(Self::from_json_object(value)),
            _ => Err(TreeViolation::RootNotObject),
        }
    }

    fn from_json_object(value: &Value) -> Self {
        let mut tree = StateTree::new();
        let Value::Object(map) = value else {
            return tree;
        };
        for (key, child) in map {
            match child {
                Value::Bool(active) => tree.insert(key.clone(), StateNode::Leaf(*active)),
                Value::Object(_) => {
                    tree.insert(key.clone(), StateNode::Branch(Self::from_json_object(child)))
                }
                other => warn!(key = %key, value = %other, "Skipping non-boolean state tree entry"),
            }
        }
        tree
    }

    /// Validate the whole tree, accumulating ALL violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<TreeViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<TreeViolation>>> = Vec::new();
        self.check_names("", &mut checks);

        if let Some((_, StateNode::Leaf(_))) =
            self.entries.iter().find(|(key, _)| key == ORIENTATION_GROUP)
        {
            checks.push(Validation::fail(TreeViolation::ReservedGroup {
                name: ORIENTATION_GROUP.to_string(),
            }));
        }

        let mut seen = HashSet::new();
        let mut classes: HashMap<String, String> = HashMap::new();
        for leaf in self.leaves() {
            let full_name = leaf.full_name();
            if !seen.insert(full_name.clone()) {
                checks.push(Validation::fail(TreeViolation::Duplicate { full_name }));
                continue;
            }
            let class_name = join_name('-', &leaf.name, leaf.group.as_deref());
            if let Some(first) = classes.get(&class_name) {
                checks.push(Validation::fail(TreeViolation::ClassCollision {
                    first: first.clone(),
                    second: full_name,
                    class_name,
                }));
                continue;
            }
            classes.insert(class_name, full_name.clone());
            if leaf.group.as_deref() == Some(ORIENTATION_GROUP)
                && Orientation::from_name(&leaf.name).is_none()
            {
                checks.push(Validation::fail(TreeViolation::UnknownOrientation {
                    name: full_name,
                }));
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    fn check_names(&self, path: &str, checks: &mut Vec<Validation<(), NonEmptyVec<TreeViolation>>>) {
        for (key, node) in &self.entries {
            checks.push(check_name(path, key));
            if let StateNode::Branch(inner) = node {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                inner.check_names(&child_path, checks);
            }
        }
    }

    #[doc(hidden)]
    pub fn token_key(raw: &str) -> String {
        raw.trim_matches('"').to_string()
    }
}

fn check_name(path: &str, name: &str) -> Validation<(), NonEmptyVec<TreeViolation>> {
    if name.is_empty() {
        let path = if path.is_empty() { "<root>" } else { path };
        return Validation::fail(TreeViolation::EmptyName {
            path: path.to_string(),
        });
    }
    match name
        .chars()
        .find(|c| c.is_whitespace() || RESERVED_CHARACTERS.contains(c))
    {
        Some(character) => Validation::fail(TreeViolation::ReservedCharacter {
            name: name.to_string(),
            character,
        }),
        None => Validation::success(()),
    }
}

impl TryFrom<&Value> for StateTree {
    type Error = TreeViolation;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

impl<'de> Deserialize<'de> for StateTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn screens() -> StateTree {
        StateTree::new().with(
            "screen",
            StateNode::Branch(
                StateTree::new()
                    .with("welcome", StateNode::Leaf(true))
                    .with("login", StateNode::Leaf(false)),
            ),
        )
    }

    #[test]
    fn leaves_keep_declaration_order() {
        let tree = screens().with("menu", StateNode::Leaf(false));
        let leaves = tree.leaves();

        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves[0].full_name(), "screen:welcome");
        assert!(leaves[0].active);
        assert_eq!(leaves[1].full_name(), "screen:login");
        assert_eq!(leaves[2].full_name(), "menu");
        assert_eq!(leaves[2].group, None);
    }

    #[test]
    fn nested_branches_keep_outermost_group() {
        let tree = StateTree::new().with(
            "screen",
            StateNode::Branch(StateTree::new().with(
                "settings",
                StateNode::Branch(StateTree::new().with("privacy", StateNode::Leaf(false))),
            )),
        );

        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].full_name(), "screen:privacy");
    }

    #[test]
    fn insert_replaces_existing_key_in_place() {
        let mut tree = StateTree::new()
            .with("a", StateNode::Leaf(false))
            .with("b", StateNode::Leaf(false));
        tree.insert("a", StateNode::Leaf(true));

        let leaves = tree.leaves();
        assert_eq!(leaves[0].name, "a");
        assert!(leaves[0].active);
        assert_eq!(leaves.len(), 2);
    }

    #[test]
    fn from_json_preserves_key_order_and_skips_scalars() {
        let value = json!({
            "screen": { "welcome": true, "login": false, "title": "ignored" },
            "menu": false,
            "count": 3
        });

        let tree = StateTree::from_json(&value).unwrap();
        let names: Vec<String> = tree.leaves().iter().map(TreeLeaf::full_name).collect();
        assert_eq!(names, vec!["screen:welcome", "screen:login", "menu"]);
    }

    #[test]
    fn from_json_rejects_non_object_root() {
        assert_eq!(
            StateTree::from_json(&json!([true])),
            Err(TreeViolation::RootNotObject)
        );
    }

    #[test]
    fn deserializes_from_json_text() {
        let tree: StateTree = serde_json::from_str(r#"{"screen": {"home": true}}"#).unwrap();
        assert_eq!(tree.leaves()[0].full_name(), "screen:home");
    }

    #[test]
    fn orientation_defaults_are_prepended_once() {
        let tree = screens().with_orientation_defaults();
        let names: Vec<String> = tree.leaves().iter().map(TreeLeaf::full_name).collect();
        assert_eq!(
            names,
            vec![
                "orientation:portrait",
                "orientation:landscape",
                "screen:welcome",
                "screen:login"
            ]
        );

        let again = tree.clone().with_orientation_defaults();
        assert_eq!(again, tree);
    }

    #[test]
    fn valid_tree_passes_validation() {
        assert!(screens().validate().is_success());
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let tree = StateTree::new()
            .with(
                "screen",
                StateNode::Branch(
                    StateTree::new()
                        .with("home", StateNode::Leaf(true))
                        .with("nested", StateNode::Branch(StateTree::new().with("home", StateNode::Leaf(false))))
                        .with("a,b", StateNode::Leaf(false)),
                ),
            )
            .with("", StateNode::Leaf(false))
            .with("screen-home", StateNode::Leaf(false))
            .with(
                "orientation",
                StateNode::Branch(StateTree::new().with("upside-down", StateNode::Leaf(false))),
            );

        match tree.validate() {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 5);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TreeViolation::Duplicate { full_name } if full_name == "screen:home")));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TreeViolation::ReservedCharacter { character: ',', .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TreeViolation::EmptyName { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TreeViolation::UnknownOrientation { .. })));
                assert!(errors.iter().any(|e| matches!(
                    e,
                    TreeViolation::ClassCollision { first, second, class_name }
                        if first == "screen:home" && second == "screen-home" && class_name == "screen-home"
                )));
            }
            Validation::Success(_) => panic!("Expected violations, got success"),
        }
    }

    #[test]
    fn grouped_and_ungrouped_states_cannot_share_a_class() {
        let tree = screens().with("screen-login", StateNode::Leaf(false));
        match tree.validate() {
            Validation::Failure(errors) => assert_eq!(
                errors.into_vec(),
                vec![TreeViolation::ClassCollision {
                    first: "screen:login".into(),
                    second: "screen-login".into(),
                    class_name: "screen-login".into(),
                }]
            ),
            Validation::Success(_) => panic!("Expected a class collision"),
        }
    }

    #[test]
    fn orientation_cannot_be_a_plain_state() {
        let tree = screens().with("orientation", StateNode::Leaf(false));
        match tree.validate() {
            Validation::Failure(errors) => assert_eq!(
                errors.into_vec(),
                vec![TreeViolation::ReservedGroup {
                    name: "orientation".into()
                }]
            ),
            Validation::Success(_) => panic!("Expected a reserved group violation"),
        }
    }

    #[test]
    fn partial_orientation_group_is_completed() {
        let tree = screens()
            .with(
                "orientation",
                StateNode::Branch(StateTree::new().with("portrait", StateNode::Leaf(false))),
            )
            .with_orientation_defaults();
        let names: Vec<String> = tree.leaves().iter().map(TreeLeaf::full_name).collect();
        assert_eq!(
            names,
            vec![
                "screen:welcome",
                "screen:login",
                "orientation:portrait",
                "orientation:landscape"
            ]
        );
        assert!(tree.validate().is_success());
    }

    #[test]
    fn whitespace_in_names_is_rejected() {
        let tree = StateTree::new().with("login filled", StateNode::Leaf(false));
        assert!(tree.validate().is_failure());
    }

    #[test]
    fn token_key_strips_quotes() {
        assert_eq!(StateTree::token_key("\"login-filled\""), "login-filled");
        assert_eq!(StateTree::token_key("welcome"), "welcome");
    }
}
