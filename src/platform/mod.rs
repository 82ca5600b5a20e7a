//! The seam between the engine and whatever renders it.
//!
//! The engine never talks to a browser directly. It drives three small
//! traits: [`Document`] for elements, classes and the stylesheet,
//! [`Navigation`] for the history stack and location, and [`Viewport`] for
//! device orientation. Anything implementing all three is a [`Platform`].
//!
//! [`MemoryPlatform`] is a complete in-memory implementation used for
//! headless runs and tests.

mod memory;

pub use memory::{MemoryElement, MemoryPlatform, Traversal};

use crate::history::HistoryEntry;

/// Opaque handle to a rendered element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

/// Element tree, class lists, inline style and the stylesheet.
pub trait Document {
    /// The element whose classes carry the active states.
    fn body(&self) -> ElementId;

    fn create_element(&mut self, tag: &str) -> ElementId;

    fn set_element_id(&mut self, element: ElementId, id: &str);

    fn append_child(&mut self, parent: ElementId, child: ElementId);

    fn prepend_child(&mut self, parent: ElementId, child: ElementId);

    fn add_class(&mut self, element: ElementId, class: &str);

    fn remove_class(&mut self, element: ElementId, class: &str);

    fn set_style(&mut self, element: ElementId, property: &str, value: &str);

    fn set_data(&mut self, element: ElementId, key: &str, value: &str);

    fn set_inner_html(&mut self, element: ElementId, html: &str);

    fn inner_html(&self, element: ElementId) -> String;

    /// Append a clone of the template with this id; `false` if none exists.
    fn import_template(&mut self, element: ElementId, template_id: &str) -> bool;

    fn insert_rule(&mut self, css: &str);
}

/// The browser navigation stack.
pub trait Navigation {
    /// Add an entry and move the location to `search`.
    fn push_state(&mut self, entry: HistoryEntry, search: &str);

    /// Overwrite the current entry's state, keeping the location.
    fn replace_state(&mut self, entry: HistoryEntry);

    /// Current `location.search`, e.g. `?screen:home` or empty.
    fn location_search(&self) -> String;
}

/// Device information.
pub trait Viewport {
    /// Rotation angle in degrees on devices that report one.
    ///
    /// `Some` marks the platform as mobile.
    fn orientation_angle(&self) -> Option<i32>;
}

/// Everything the engine needs from its host.
pub trait Platform: Document + Navigation + Viewport {}

impl<T: Document + Navigation + Viewport> Platform for T {}
