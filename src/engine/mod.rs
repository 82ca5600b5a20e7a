//! The engine: the imperative shell around the registry.
//!
//! [`Engine`] owns everything a running prototype needs: the registry, the
//! orientation slot, the compiled visibility rule, the layer tree, the
//! observer list and the platform it renders to. There is no global state;
//! every operation goes through an engine value.
//!
//! # Transitions
//!
//! Every change to the active set goes through one of three paths, which
//! differ only in their side effects:
//!
//! | origin  | history push | notifications |
//! |---------|--------------|---------------|
//! | setup   | no           | no            |
//! | restore | no           | yes           |
//! | user    | yes          | yes           |
//!
//! Orientation never touches history on any path.

mod config;
mod control;
mod error;
mod layers;
mod navigation;

pub use config::{EngineConfig, FallbackSize};
pub use control::StateControl;
pub use error::EngineError;

use crate::core::{
    ActiveStateSet, Orientation, OrientationChange, OrientationSlot, State, StateRegistry,
    StateTree,
};
use crate::history::{to_query, HistoryEntry};
use crate::layer::Layer;
use crate::notify::{Notification, ObserverId, Observers};
use crate::platform::{Document, Navigation, Platform, Viewport};
use crate::visibility::VisibilityRule;
use std::collections::HashMap;
use stillwater::validation::Validation;
use tracing::{debug, info};

/// Why a transition is happening.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Initial tree and URL during [`Engine::init`].
    Setup,
    /// Back/forward navigation.
    Restore,
    /// A click or an explicit call.
    User,
}

impl Origin {
    fn notifies(self) -> bool {
        self != Origin::Setup
    }

    fn pushes_history(self) -> bool {
        self == Origin::User
    }
}

/// A running prototype.
///
/// # Example
///
/// ```rust
/// use clickthrough::platform::Navigation;
/// use clickthrough::{state_tree, Engine, EngineConfig, MemoryPlatform};
///
/// let tree = state_tree! {
///     screen: { welcome: true, login: false },
///     menu: false,
/// };
/// let mut engine = Engine::init(MemoryPlatform::new(), tree, EngineConfig::default()).unwrap();
///
/// engine.set_state("screen:login").unwrap();
/// assert!(engine.is_in_state("screen:login"));
/// assert!(!engine.is_in_state("screen:welcome"));
/// assert_eq!(engine.platform().location_search(), "?screen:login");
/// ```
pub struct Engine<P: Platform> {
    config: EngineConfig,
    platform: P,
    registry: StateRegistry,
    orientation: OrientationSlot,
    mobile: bool,
    rule: VisibilityRule,
    canvas: Layer,
    layers: HashMap<String, Layer>,
    observers: Observers,
    generated_ids: usize,
}

impl<P: Platform> Engine<P> {
    /// Build the state machine from `tree` and reconcile it with the URL.
    pub fn init(platform: P, tree: StateTree, config: EngineConfig) -> Result<Self, EngineError> {
        Self::init_with_observers(platform, tree, config, Observers::new())
    }

    pub(crate) fn init_with_observers(
        mut platform: P,
        tree: StateTree,
        config: EngineConfig,
        observers: Observers,
    ) -> Result<Self, EngineError> {
        config.check()?;
        let mobile = platform.orientation_angle().is_some();
        let tree = if mobile {
            tree.with_orientation_defaults()
        } else {
            tree
        };
        if let Validation::Failure(violations) = tree.validate() {
            return Err(EngineError::InvalidStateTree {
                violations: violations.into_vec(),
            });
        }

        let body = platform.body();
        let element = platform.create_element("div");
        platform.set_element_id(element, &config.canvas_id);
        platform.prepend_child(body, element);
        let canvas = Layer::new(config.canvas_id.clone(), element, None);

        let mut engine = Self {
            config,
            platform,
            registry: StateRegistry::new(),
            orientation: OrientationSlot::new(),
            mobile,
            rule: VisibilityRule::default(),
            canvas,
            layers: HashMap::new(),
            observers,
            generated_ids: 0,
        };

        let leaves = tree.leaves();
        for leaf in &leaves {
            engine.registry.register(&leaf.name, leaf.group.as_deref())?;
        }
        for leaf in leaves.iter().filter(|leaf| leaf.active) {
            engine.activate(&leaf.full_name(), Origin::Setup)?;
        }

        engine.rule = VisibilityRule::compile(&engine.registry, &engine.config.visible_suffix);
        if let Some(css) = engine.rule.css() {
            engine.platform.insert_rule(&css);
        }

        engine.restore_initial()?;
        engine.init_orientation()?;

        info!(
            states = engine.registry.len(),
            active = engine.registry.active().len(),
            mobile,
            "Prototype initialized"
        );
        Ok(engine)
    }

    fn init_orientation(&mut self) -> Result<(), EngineError> {
        let body = self.platform.body();
        if !self.mobile {
            let class = self.config.desktop_class();
            self.platform.add_class(body, &class);
            return Ok(());
        }
        let class = self.config.mobile_class();
        self.platform.add_class(body, &class);
        if let Some(angle) = self.platform.orientation_angle() {
            self.apply_orientation(Orientation::from_angle(angle), Origin::Setup)?;
        }
        Ok(())
    }

    /// Activate a state, displacing any active sibling in its group.
    ///
    /// Orientation states go to the orientation slot instead.
    pub fn set_state(&mut self, full_name: &str) -> Result<(), EngineError> {
        self.activate(full_name, Origin::User)
    }

    /// Deactivate a state and record the change in history.
    pub fn remove_state(&mut self, full_name: &str) -> Result<(), EngineError> {
        self.deactivate(full_name, Origin::User, false)
    }

    /// Deactivate a state without a history entry of its own.
    pub fn remove_state_indirect(&mut self, full_name: &str) -> Result<(), EngineError> {
        self.deactivate(full_name, Origin::User, true)
    }

    /// Whether a state is active, orientation slot included.
    pub fn is_in_state(&self, full_name: &str) -> bool {
        self.registry.is_active(full_name) || self.orientation.holds(full_name)
    }

    /// Whether a state is registered.
    pub fn has_state(&self, full_name: &str) -> bool {
        self.registry.contains(full_name)
    }

    /// Active states in activation order. Orientation is not included.
    pub fn active_states(&self) -> &ActiveStateSet {
        self.registry.active()
    }

    /// Current device orientation, if one has been set.
    pub fn orientation(&self) -> Option<Orientation> {
        self.orientation.get()
    }

    /// Whether the platform reported an orientation at init.
    pub fn is_mobile(&self) -> bool {
        self.mobile
    }

    /// Force an orientation. Only honoured on desktop, where no device
    /// reports one.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), EngineError> {
        if self.mobile {
            debug!(orientation = orientation.name(), "Ignoring forced orientation on mobile");
            return Ok(());
        }
        self.apply_orientation(orientation, Origin::User)
    }

    /// React to a device orientation event.
    pub fn orientation_changed(&mut self, angle: i32) -> Result<(), EngineError> {
        if !self.mobile {
            debug!(angle, "Ignoring orientation event on desktop");
            return Ok(());
        }
        self.apply_orientation(Orientation::from_angle(angle), Origin::User)
    }

    /// Register an observer for state notifications.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&Notification) + 'static,
    {
        self.observers.subscribe(Box::new(observer))
    }

    /// Remove an observer. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Effective configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registered states and the active set.
    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    /// The compiled visibility rule.
    pub fn rule(&self) -> &VisibilityRule {
        &self.rule
    }

    /// The host platform.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Mutable access to the host platform.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Classes the engine currently keeps on the body for states.
    pub fn root_classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self
            .registry
            .active()
            .iter()
            .filter_map(|name| self.registry.get(name))
            .map(|state| state.class_name().to_string())
            .collect();
        if let Some(state) = self
            .orientation
            .get()
            .and_then(|o| self.registry.get(&o.full_name()))
        {
            classes.push(state.class_name().to_string());
        }
        classes
    }

    pub(crate) fn activate(&mut self, full_name: &str, origin: Origin) -> Result<(), EngineError> {
        let state = self.registry.require(full_name)?.clone();
        if state.is_orientation() {
            let orientation =
                Orientation::from_name(state.name()).ok_or_else(|| EngineError::InvalidState {
                    name: full_name.to_string(),
                })?;
            return self.apply_orientation(orientation, origin);
        }
        for sibling in self.registry.exclusive_conflicts(&state) {
            self.deactivate(&sibling, origin, true)?;
        }

        self.registry.activate(full_name);
        let body = self.platform.body();
        self.platform.add_class(body, state.class_name());
        debug!(state = full_name, ?origin, "State set");

        if origin.pushes_history() {
            self.push_history()?;
        }
        if origin.notifies() {
            self.notify(Notification::StateSet(full_name.to_string()));
        }
        Ok(())
    }

    pub(crate) fn deactivate(
        &mut self,
        full_name: &str,
        origin: Origin,
        indirect: bool,
    ) -> Result<(), EngineError> {
        let state = self.registry.require(full_name)?.clone();
        if state.is_orientation() {
            return self.clear_orientation(&state, origin);
        }

        let was_active = self.registry.deactivate(full_name);
        let body = self.platform.body();
        self.platform.remove_class(body, state.class_name());
        debug!(state = full_name, ?origin, indirect, "State removed");

        if !indirect && origin.pushes_history() {
            self.push_history()?;
        }
        if was_active && origin.notifies() {
            self.notify(Notification::StateRemoved(full_name.to_string()));
        }
        Ok(())
    }

    fn apply_orientation(&mut self, next: Orientation, origin: Origin) -> Result<(), EngineError> {
        let next_state = self.registry.require(&next.full_name())?.clone();
        let Some(change) = self.orientation.swap(next) else {
            return Ok(());
        };
        let OrientationChange { previous, current } = change;
        let displaced = change.displaced().full_name();

        let body = self.platform.body();
        if let Some(state) = self.registry.get(&displaced) {
            self.platform.remove_class(body, state.class_name());
        }
        self.platform.add_class(body, next_state.class_name());
        debug!(?previous, ?current, ?origin, "Orientation changed");

        if origin.notifies() {
            self.notify(Notification::StateRemoved(displaced));
            self.notify(Notification::StateSet(current.full_name()));
        }
        Ok(())
    }

    fn clear_orientation(&mut self, state: &State, origin: Origin) -> Result<(), EngineError> {
        if !self.orientation.holds(state.full_name()) {
            return Ok(());
        }
        self.orientation.clear();
        let body = self.platform.body();
        self.platform.remove_class(body, state.class_name());
        if origin.notifies() {
            self.notify(Notification::StateRemoved(state.full_name().to_string()));
        }
        Ok(())
    }

    fn push_history(&mut self) -> Result<(), EngineError> {
        let active = self.registry.active();
        let entry = HistoryEntry::capture(active)?;
        let search = to_query(active.iter());
        debug!(entry = %entry.id, search = %search, "History pushed");
        self.platform.push_state(entry, &search);
        Ok(())
    }

    fn notify(&mut self, notification: Notification) {
        debug!(%notification, "Notify");
        self.observers.publish(&notification);
    }
}

impl<P: Platform> StateControl for Engine<P> {
    fn set_state(&mut self, full_name: &str) -> Result<(), EngineError> {
        Engine::set_state(self, full_name)
    }

    fn remove_state(&mut self, full_name: &str) -> Result<(), EngineError> {
        Engine::remove_state(self, full_name)
    }

    fn is_in_state(&self, full_name: &str) -> bool {
        Engine::is_in_state(self, full_name)
    }

    fn has_state(&self, full_name: &str) -> bool {
        Engine::has_state(self, full_name)
    }
}

impl<P: Platform> std::fmt::Debug for Engine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("orientation", &self.orientation)
            .field("mobile", &self.mobile)
            .field("layers", &self.layers.len())
            .field("observers", &self.observers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TreeViolation;
    use crate::platform::{MemoryPlatform, Navigation};
    use crate::state_tree;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine() -> Engine<MemoryPlatform> {
        let tree = state_tree! {
            screen: { welcome: true, login: false, home: false },
            menu: false,
            badge: true,
        };
        Engine::init(MemoryPlatform::new(), tree, EngineConfig::default()).unwrap()
    }

    fn record(engine: &mut Engine<MemoryPlatform>) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        engine.subscribe(move |n: &Notification| sink.borrow_mut().push(n.to_string()));
        log
    }

    #[test]
    fn init_applies_tree_defaults() {
        let engine = engine();
        assert_eq!(engine.active_states().to_vec(), vec!["screen:welcome", "badge"]);
        assert!(engine.platform().body_classes().contains(&"screen-welcome".to_string()));
        assert!(engine
            .platform()
            .body_classes()
            .contains(&"clickthrough-desktop".to_string()));
        assert_eq!(engine.platform().history_len(), 1);
    }

    #[test]
    fn init_inserts_visibility_rule() {
        let engine = engine();
        assert_eq!(
            engine.platform().rules(),
            [".screen-welcome .screen-welcome--visible, .screen-login .screen-login--visible, \
              .screen-home .screen-home--visible, .menu .menu--visible, \
              .badge .badge--visible {display: block;}"
                .to_string()]
        );
    }

    #[test]
    fn set_state_displaces_sibling_and_pushes_once() {
        let mut engine = engine();
        let log = record(&mut engine);

        engine.set_state("screen:login").unwrap();

        assert_eq!(engine.active_states().to_vec(), vec!["badge", "screen:login"]);
        assert_eq!(engine.platform().history_len(), 2);
        assert_eq!(engine.platform().location_search(), "?badge,screen:login");
        assert_eq!(
            *log.borrow(),
            vec!["removeState(screen:welcome)", "setState(screen:login)"]
        );
    }

    #[test]
    fn setting_an_active_state_reapplies_it() {
        let mut engine = engine();
        let log = record(&mut engine);

        engine.set_state("badge").unwrap();
        engine.set_state("screen:welcome").unwrap();

        assert_eq!(engine.platform().history_len(), 3);
        assert_eq!(engine.active_states().to_vec(), vec!["badge", "screen:welcome"]);
        assert!(engine.platform().body_classes().contains(&"screen-welcome".to_string()));
        assert_eq!(
            *log.borrow(),
            vec![
                "setState(badge)",
                "removeState(screen:welcome)",
                "setState(screen:welcome)"
            ]
        );
    }

    #[test]
    fn invalid_states_are_rejected() {
        let mut engine = engine();
        assert!(matches!(
            engine.set_state("screen:nowhere"),
            Err(EngineError::InvalidState { .. })
        ));
        assert!(matches!(
            engine.remove_state("nowhere"),
            Err(EngineError::InvalidState { .. })
        ));
        assert!(!engine.is_in_state("nowhere"));
    }

    #[test]
    fn remove_inactive_state_pushes_without_notifying() {
        let mut engine = engine();
        let log = record(&mut engine);

        engine.remove_state("menu").unwrap();

        assert_eq!(engine.platform().history_len(), 2);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn indirect_removal_skips_history() {
        let mut engine = engine();
        let log = record(&mut engine);

        engine.remove_state_indirect("badge").unwrap();

        assert_eq!(engine.platform().history_len(), 1);
        assert_eq!(*log.borrow(), vec!["removeState(badge)"]);
    }

    #[test]
    fn ungrouped_states_coexist() {
        let mut engine = engine();
        engine.set_state("menu").unwrap();
        assert!(engine.is_in_state("menu"));
        assert!(engine.is_in_state("badge"));
    }

    #[test]
    fn invalid_tree_fails_init() {
        let tree = StateTree::new()
            .with("menu", crate::core::StateNode::Leaf(false))
            .with(
                "group",
                crate::core::StateNode::Branch(
                    StateTree::new().with("bad name", crate::core::StateNode::Leaf(false)),
                ),
            );
        let result = Engine::init(MemoryPlatform::new(), tree, EngineConfig::default());
        assert!(matches!(result, Err(EngineError::InvalidStateTree { .. })));
    }

    #[test]
    fn colliding_class_names_fail_init() {
        let tree = state_tree! {
            screen: { welcome: true, login: false },
            "screen-login": false,
        };
        let result = Engine::init(MemoryPlatform::new(), tree, EngineConfig::default());
        assert!(matches!(
            result,
            Err(EngineError::InvalidStateTree { violations })
                if violations.iter().any(|v| matches!(v, TreeViolation::ClassCollision { .. }))
        ));
    }

    #[test]
    fn partial_orientation_group_still_tracks_device() {
        let tree = state_tree! {
            screen: { welcome: true },
            orientation: { portrait: false },
        };
        let platform = MemoryPlatform::new().with_orientation_angle(90);
        let mut engine = Engine::init(platform, tree, EngineConfig::default()).unwrap();

        assert_eq!(engine.orientation(), Some(Orientation::Landscape));
        engine.orientation_changed(0).unwrap();
        assert!(engine.is_in_state("orientation:portrait"));
        assert!(!engine.is_in_state("orientation:landscape"));
    }

    #[test]
    fn canvas_is_first_child_of_body() {
        let engine = engine();
        let body = engine.platform().body();
        let first = engine.platform().element(body).unwrap().children[0];
        assert_eq!(first, engine.canvas().element());
        assert_eq!(
            engine.platform().element(first).unwrap().id.as_deref(),
            Some("Canvas")
        );
    }

    #[test]
    fn desktop_orientation_can_be_forced() {
        let tree = state_tree! {
            orientation: { portrait: false, landscape: false },
            screen: { home: true },
        };
        let mut engine = Engine::init(MemoryPlatform::new(), tree, EngineConfig::default()).unwrap();
        let log = record(&mut engine);

        engine.set_orientation(Orientation::Landscape).unwrap();
        engine.set_orientation(Orientation::Landscape).unwrap();

        assert_eq!(engine.orientation(), Some(Orientation::Landscape));
        assert!(engine.is_in_state("orientation:landscape"));
        assert_eq!(
            *log.borrow(),
            vec![
                "removeState(orientation:portrait)",
                "setState(orientation:landscape)"
            ]
        );
        assert_eq!(engine.platform().history_len(), 1);
    }

    #[test]
    fn forcing_orientation_needs_declared_states_on_desktop() {
        let mut engine = engine();
        assert!(matches!(
            engine.set_orientation(Orientation::Portrait),
            Err(EngineError::InvalidState { .. })
        ));
    }

    #[test]
    fn root_classes_follow_active_set() {
        let mut engine = engine();
        engine.set_state("screen:home").unwrap();
        assert_eq!(engine.root_classes(), vec!["badge", "screen-home"]);
    }
}
