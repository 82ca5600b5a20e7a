//! Visibility rule generation.
//!
//! One stylesheet rule is compiled at startup. For each registered state it
//! pairs the body class with the layer companion class:
//!
//! ```css
//! .screen-home .screen-home--visible, .menu .menu--visible {display: block;}
//! ```
//!
//! Showing and hiding layers is then a matter of toggling body classes; no
//! layer is touched on a transition.

use crate::core::StateRegistry;

/// Class carried by layers that are always shown.
pub const ALWAYS_VISIBLE_CLASS: &str = "visible";

/// One `.root .root--visible` selector pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorPair {
    pub root_class: String,
    pub layer_class: String,
}

/// The compiled rule, kept around so visibility can be evaluated headlessly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilityRule {
    pairs: Vec<SelectorPair>,
}

impl VisibilityRule {
    /// Compile the rule for every state in the registry.
    pub fn compile(registry: &StateRegistry, visible_suffix: &str) -> Self {
        let pairs = registry
            .states()
            .map(|state| SelectorPair {
                root_class: state.class_name().to_string(),
                layer_class: state.visible_class(visible_suffix),
            })
            .collect();
        Self { pairs }
    }

    /// Selector pairs in registration order.
    pub fn pairs(&self) -> &[SelectorPair] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// CSS text of the rule, or `None` when no state is registered.
    pub fn css(&self) -> Option<String> {
        if self.pairs.is_empty() {
            return None;
        }
        let selectors: Vec<String> = self
            .pairs
            .iter()
            .map(|pair| format!(".{} .{}", pair.root_class, pair.layer_class))
            .collect();
        Some(format!("{} {{display: block;}}", selectors.join(", ")))
    }

    /// Whether an element with `layer_classes` is displayed under a body
    /// carrying `root_classes`.
    pub fn shows<R, L>(&self, root_classes: &[R], layer_classes: &[L]) -> bool
    where
        R: AsRef<str>,
        L: AsRef<str>,
    {
        let has = |classes: &[L], wanted: &str| classes.iter().any(|c| c.as_ref() == wanted);
        if has(layer_classes, ALWAYS_VISIBLE_CLASS) {
            return true;
        }
        self.pairs.iter().any(|pair| {
            has(layer_classes, &pair.layer_class)
                && root_classes.iter().any(|c| c.as_ref() == pair.root_class)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> VisibilityRule {
        let mut registry = StateRegistry::new();
        registry.register("home", Some("screen")).unwrap();
        registry.register("menu", None).unwrap();
        VisibilityRule::compile(&registry, "--visible")
    }

    #[test]
    fn css_unions_all_pairs() {
        assert_eq!(
            rule().css().unwrap(),
            ".screen-home .screen-home--visible, .menu .menu--visible {display: block;}"
        );
    }

    #[test]
    fn empty_registry_has_no_css() {
        let rule = VisibilityRule::compile(&StateRegistry::new(), "--visible");
        assert!(rule.is_empty());
        assert_eq!(rule.css(), None);
    }

    #[test]
    fn shows_requires_matching_root_class() {
        let rule = rule();
        let layer = ["clickthrough-layer", "screen-home--visible"];

        assert!(rule.shows(&["screen-home"], &layer));
        assert!(!rule.shows(&["menu"], &layer));
        assert!(!rule.shows::<&str, &str>(&[], &layer));
    }

    #[test]
    fn always_visible_class_ignores_root() {
        let rule = rule();
        assert!(rule.shows::<&str, &str>(&[], &[ALWAYS_VISIBLE_CLASS]));
    }

    #[test]
    fn multiple_companions_compose_with_or() {
        let rule = rule();
        let layer = ["screen-home--visible", "menu--visible"];

        assert!(rule.shows(&["menu"], &layer));
        assert!(rule.shows(&["screen-home"], &layer));
        assert!(!rule.shows(&["screen-other"], &layer));
    }
}
