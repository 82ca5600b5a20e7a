//! In-memory platform: element arena, stylesheet and navigation stack.

use super::{Document, ElementId, Navigation, Viewport};
use crate::history::HistoryEntry;
use std::collections::{BTreeMap, HashMap};

/// A rendered element as the in-memory document sees it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryElement {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub styles: BTreeMap<String, String>,
    pub data: BTreeMap<String, String>,
    pub inner_html: String,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
}

impl MemoryElement {
    /// Whether the element carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Inline style value for `property`.
    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }
}

/// Outcome of moving through the navigation stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Traversal {
    /// Landed on another entry; carries its state object, if any.
    Moved(Option<HistoryEntry>),
    /// Went back past the first entry and left the page.
    Exited,
    /// Nothing to go forward to.
    Stayed,
}

#[derive(Clone, Debug)]
struct NavigationRecord {
    state: Option<HistoryEntry>,
    search: String,
}

/// A headless [`Platform`](super::Platform).
///
/// # Example
///
/// ```rust
/// use clickthrough::platform::{Document, MemoryPlatform, Navigation, Traversal};
///
/// let mut platform = MemoryPlatform::new().with_search("?screen:home");
/// assert_eq!(platform.location_search(), "?screen:home");
///
/// let body = platform.body();
/// platform.add_class(body, "screen-home");
/// assert!(platform.body_classes().contains(&"screen-home".to_string()));
///
/// assert_eq!(platform.back(), Traversal::Exited);
/// ```
#[derive(Clone, Debug)]
pub struct MemoryPlatform {
    elements: Vec<MemoryElement>,
    body: ElementId,
    rules: Vec<String>,
    templates: HashMap<String, String>,
    records: Vec<NavigationRecord>,
    cursor: usize,
    exited: bool,
    orientation_angle: Option<i32>,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPlatform {
    /// A desktop page with an empty location.
    pub fn new() -> Self {
        let body = MemoryElement {
            tag: "body".to_string(),
            ..MemoryElement::default()
        };
        Self {
            elements: vec![body],
            body: ElementId(0),
            rules: Vec::new(),
            templates: HashMap::new(),
            records: vec![NavigationRecord {
                state: None,
                search: String::new(),
            }],
            cursor: 0,
            exited: false,
            orientation_angle: None,
        }
    }

    /// Start the page at this location search.
    pub fn with_search(mut self, search: &str) -> Self {
        self.records[self.cursor].search = search.to_string();
        self
    }

    /// Report a device orientation angle, making the platform mobile.
    pub fn with_orientation_angle(mut self, angle: i32) -> Self {
        self.orientation_angle = Some(angle);
        self
    }

    /// Register markup for [`Document::import_template`].
    pub fn with_template(mut self, id: &str, html: &str) -> Self {
        self.templates.insert(id.to_string(), html.to_string());
        self
    }

    /// Simulate the device rotating.
    pub fn set_orientation_angle(&mut self, angle: i32) {
        self.orientation_angle = Some(angle);
    }

    /// Look up an element by handle.
    pub fn element(&self, element: ElementId) -> Option<&MemoryElement> {
        self.elements.get(element.0)
    }

    /// Find an element by its `id` attribute.
    pub fn find(&self, id: &str) -> Option<&MemoryElement> {
        self.elements
            .iter()
            .find(|element| element.id.as_deref() == Some(id))
    }

    /// Classes on the body element.
    pub fn body_classes(&self) -> &[String] {
        &self.elements[self.body.0].classes
    }

    /// Stylesheet rules inserted so far.
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Number of history entries.
    pub fn history_len(&self) -> usize {
        self.records.len()
    }

    /// Position of the current entry.
    pub fn history_index(&self) -> usize {
        self.cursor
    }

    /// State object of the current entry.
    pub fn current_state(&self) -> Option<&HistoryEntry> {
        self.records[self.cursor].state.as_ref()
    }

    /// Whether a back navigation has left the page.
    pub fn has_exited(&self) -> bool {
        self.exited
    }

    /// Step back one entry, or leave the page from the first.
    pub fn back(&mut self) -> Traversal {
        if self.cursor == 0 {
            self.exited = true;
            return Traversal::Exited;
        }
        self.cursor -= 1;
        Traversal::Moved(self.records[self.cursor].state.clone())
    }

    /// Step forward one entry if there is one.
    pub fn forward(&mut self) -> Traversal {
        if self.cursor + 1 >= self.records.len() {
            return Traversal::Stayed;
        }
        self.cursor += 1;
        Traversal::Moved(self.records[self.cursor].state.clone())
    }

    fn element_mut(&mut self, element: ElementId) -> &mut MemoryElement {
        &mut self.elements[element.0]
    }

    fn detach(&mut self, child: ElementId) {
        if let Some(parent) = self.elements[child.0].parent.take() {
            self.elements[parent.0].children.retain(|c| *c != child);
        }
    }
}

impl Document for MemoryPlatform {
    fn body(&self) -> ElementId {
        self.body
    }

    fn create_element(&mut self, tag: &str) -> ElementId {
        self.elements.push(MemoryElement {
            tag: tag.to_string(),
            ..MemoryElement::default()
        });
        ElementId(self.elements.len() - 1)
    }

    fn set_element_id(&mut self, element: ElementId, id: &str) {
        self.element_mut(element).id = Some(id.to_string());
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        self.element_mut(parent).children.push(child);
        self.element_mut(child).parent = Some(parent);
    }

    fn prepend_child(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        self.element_mut(parent).children.insert(0, child);
        self.element_mut(child).parent = Some(parent);
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        let element = self.element_mut(element);
        if !element.has_class(class) {
            element.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        self.element_mut(element).classes.retain(|c| c != class);
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        self.element_mut(element)
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn set_data(&mut self, element: ElementId, key: &str, value: &str) {
        self.element_mut(element)
            .data
            .insert(key.to_string(), value.to_string());
    }

    fn set_inner_html(&mut self, element: ElementId, html: &str) {
        self.element_mut(element).inner_html = html.to_string();
    }

    fn inner_html(&self, element: ElementId) -> String {
        self.elements
            .get(element.0)
            .map(|e| e.inner_html.clone())
            .unwrap_or_default()
    }

    fn import_template(&mut self, element: ElementId, template_id: &str) -> bool {
        let Some(html) = self.templates.get(template_id).cloned() else {
            return false;
        };
        self.element_mut(element).inner_html.push_str(&html);
        true
    }

    fn insert_rule(&mut self, css: &str) {
        self.rules.insert(0, css.to_string());
    }
}

impl Navigation for MemoryPlatform {
    fn push_state(&mut self, entry: HistoryEntry, search: &str) {
        self.records.truncate(self.cursor + 1);
        self.records.push(NavigationRecord {
            state: Some(entry),
            search: search.to_string(),
        });
        self.cursor += 1;
    }

    fn replace_state(&mut self, entry: HistoryEntry) {
        self.records[self.cursor].state = Some(entry);
    }

    fn location_search(&self) -> String {
        self.records[self.cursor].search.clone()
    }
}

impl Viewport for MemoryPlatform {
    fn orientation_angle(&self) -> Option<i32> {
        self.orientation_angle
    }
}
