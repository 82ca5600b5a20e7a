//! Restoring states from history entries and the URL.

use super::{Engine, EngineError, Origin};
use crate::history::{resolve_target, HistoryEntry};
use crate::platform::{MemoryPlatform, Navigation, Platform, Traversal};
use tracing::{debug, warn};

impl<P: Platform> Engine<P> {
    /// Apply a back/forward navigation that landed on `entry`.
    ///
    /// The entry's payload wins; without one the location query is used. If
    /// neither names any states the current states are kept.
    pub fn navigate(&mut self, entry: Option<&HistoryEntry>) -> Result<(), EngineError> {
        let search = self.platform.location_search();
        match resolve_target(entry, &search) {
            Some(targets) => self.replace_states(targets, Origin::Restore),
            None => {
                debug!(search = %search, "Navigation carries no states");
                Ok(())
            }
        }
    }

    /// Reconcile with the URL on page load, then store the result in the
    /// current entry so one back navigation leaves the prototype.
    pub(super) fn restore_initial(&mut self) -> Result<(), EngineError> {
        let search = self.platform.location_search();
        if let Some(targets) = resolve_target(None, &search) {
            self.replace_states(targets, Origin::Setup)?;
        }
        let entry = HistoryEntry::capture(self.registry.active())?;
        debug!(entry = %entry.id, "Initial history entry replaced");
        self.platform.replace_state(entry);
        Ok(())
    }

    /// Clear the active set, then set every known target in order.
    fn replace_states(&mut self, targets: Vec<String>, origin: Origin) -> Result<(), EngineError> {
        for name in self.registry.active().to_vec() {
            self.deactivate(&name, origin, true)?;
        }
        for name in targets {
            if !self.registry.contains(&name) {
                warn!(state = %name, "Dropping unknown state from history");
                continue;
            }
            self.activate(&name, origin)?;
        }
        Ok(())
    }
}

impl Engine<MemoryPlatform> {
    /// Go back one entry and restore its states.
    pub fn back(&mut self) -> Result<Traversal, EngineError> {
        let traversal = self.platform.back();
        self.follow(&traversal)?;
        Ok(traversal)
    }

    /// Go forward one entry and restore its states.
    pub fn forward(&mut self) -> Result<Traversal, EngineError> {
        let traversal = self.platform.forward();
        self.follow(&traversal)?;
        Ok(traversal)
    }

    fn follow(&mut self, traversal: &Traversal) -> Result<(), EngineError> {
        match traversal {
            Traversal::Moved(entry) => self.navigate(entry.as_ref()),
            Traversal::Exited | Traversal::Stayed => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::history::HistoryEntry;
    use crate::platform::{MemoryPlatform, Navigation, Traversal};
    use crate::{state_tree, Engine, EngineConfig, Notification};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tree() -> crate::core::StateTree {
        state_tree! {
            screen: { welcome: true, login: false, likes: false },
            menu: false,
        }
    }

    fn engine_at(search: &str) -> Engine<MemoryPlatform> {
        let platform = MemoryPlatform::new().with_search(search);
        Engine::init(platform, tree(), EngineConfig::default()).unwrap()
    }

    #[test]
    fn url_overrides_tree_defaults() {
        let engine = engine_at("?screen:likes,menu");
        assert_eq!(engine.active_states().to_vec(), vec!["screen:likes", "menu"]);
        assert!(!engine.is_in_state("screen:welcome"));
    }

    #[test]
    fn initial_load_replaces_instead_of_pushing() {
        let mut engine = engine_at("?screen:likes");
        assert_eq!(engine.platform().history_len(), 1);
        assert_eq!(
            engine.platform().current_state().unwrap().states().unwrap(),
            vec!["screen:likes"]
        );

        assert_eq!(engine.back().unwrap(), Traversal::Exited);
        assert!(engine.platform().has_exited());
    }

    #[test]
    fn unknown_url_states_are_dropped() {
        let engine = engine_at("?screen:gone,menu");
        assert_eq!(engine.active_states().to_vec(), vec!["menu"]);
    }

    #[test]
    fn empty_query_keeps_defaults_and_bare_mark_clears() {
        let engine = engine_at("");
        assert_eq!(engine.active_states().to_vec(), vec!["screen:welcome"]);

        let engine = engine_at("?");
        assert!(engine.active_states().is_empty());
    }

    #[test]
    fn back_restores_payload_and_notifies() {
        let mut engine = engine_at("");
        engine.set_state("screen:login").unwrap();
        engine.set_state("menu").unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        engine.subscribe(move |n: &Notification| sink.borrow_mut().push(n.to_string()));

        engine.back().unwrap();
        assert_eq!(engine.active_states().to_vec(), vec!["screen:login"]);
        assert_eq!(
            *log.borrow(),
            vec![
                "removeState(screen:login)",
                "removeState(menu)",
                "setState(screen:login)"
            ]
        );

        engine.back().unwrap();
        assert_eq!(engine.active_states().to_vec(), vec!["screen:welcome"]);
        engine.forward().unwrap();
        engine.forward().unwrap();
        assert_eq!(engine.active_states().to_vec(), vec!["screen:login", "menu"]);
        assert_eq!(engine.platform().history_len(), 3);
    }

    #[test]
    fn foreign_entry_falls_back_to_url() {
        let mut engine = engine_at("?menu");
        let foreign = HistoryEntry::from_payload(vec![0xff]);

        engine.navigate(Some(&foreign)).unwrap();
        assert_eq!(engine.active_states().to_vec(), vec!["menu"]);
        assert_eq!(engine.platform().location_search(), "?menu");
    }
}
