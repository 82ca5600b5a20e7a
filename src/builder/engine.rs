//! Builder for engines.

use crate::core::StateTree;
use crate::engine::{Engine, EngineConfig, EngineError};
use crate::notify::{Notification, Observers};
use crate::platform::Platform;

/// Builder for an [`Engine`] with a fluent API.
///
/// Observers registered here are in place before the first transition.
pub struct EngineBuilder {
    config: EngineConfig,
    observers: Observers,
}

impl EngineBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            observers: Observers::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Prefix for generated class names.
    pub fn class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.class_prefix = prefix.into();
        self
    }

    /// Suffix of the companion class that shows a layer.
    pub fn visible_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.visible_suffix = suffix.into();
        self
    }

    /// Element id of the canvas layer.
    pub fn canvas_id(mut self, id: impl Into<String>) -> Self {
        self.config.canvas_id = id.into();
        self
    }

    /// How long an image may stay pending before it is failed.
    pub fn image_timeout_ms(mut self, timeout: u64) -> Self {
        self.config.image_timeout_ms = timeout;
        self
    }

    /// Size given to layers whose image failed to load.
    pub fn image_fallback(mut self, width: f64, height: f64) -> Self {
        self.config.image_fallback.width = width;
        self.config.image_fallback.height = height;
        self
    }

    /// Register an observer.
    pub fn observe<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&Notification) + 'static,
    {
        self.observers.subscribe(Box::new(observer));
        self
    }

    /// Initialize the engine on `platform`.
    /// Returns an error if the configuration or the tree is invalid.
    pub fn build<P: Platform>(self, platform: P, tree: StateTree) -> Result<Engine<P>, EngineError> {
        Engine::init_with_observers(platform, tree, self.config, self.observers)
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryPlatform;
    use crate::state_tree;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn builder_applies_config() {
        let engine = EngineBuilder::new()
            .class_prefix("proto")
            .canvas_id("Root")
            .build(MemoryPlatform::new(), state_tree! { menu: false })
            .unwrap();

        assert_eq!(engine.canvas().id(), "Root");
        assert!(engine
            .platform()
            .body_classes()
            .contains(&"proto-desktop".to_string()));
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = EngineBuilder::new()
            .visible_suffix("")
            .build(MemoryPlatform::new(), state_tree! { menu: false });

        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn observers_see_first_transition_but_not_setup() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);

        let mut engine = EngineBuilder::new()
            .observe(move |n: &Notification| sink.borrow_mut().push(n.clone()))
            .build(
                MemoryPlatform::new().with_search("?menu"),
                state_tree! { menu: false, badge: true },
            )
            .unwrap();
        assert!(log.borrow().is_empty());

        engine.set_state("badge").unwrap();
        assert_eq!(*log.borrow(), vec![Notification::StateSet("badge".into())]);
    }
}
