//! Fluent layer definitions.

use crate::engine::{EngineError, StateControl};
use crate::layer::{Attribute, ClickAction, Dimension, ParentRef, Visibility};

/// Attributes for one layer, applied in order when the layer is constructed.
///
/// Unset attributes take their defaults: the canvas as parent and always
/// visible. Image attributes are applied after everything else so explicit
/// sizes are in place before the preload is requested.
///
/// # Example
///
/// ```rust
/// use clickthrough::{state_tree, Engine, EngineConfig, LayerSpec, MemoryPlatform};
///
/// let tree = state_tree! { screen: { welcome: true, login: false } };
/// let mut engine = Engine::init(MemoryPlatform::new(), tree, EngineConfig::default()).unwrap();
///
/// engine
///     .add_layer(
///         LayerSpec::new()
///             .id("Welcome")
///             .image("img/welcome@2x.png")
///             .visible("screen:welcome")
///             .click("screen:login"),
///     )
///     .unwrap();
///
/// engine.click("Welcome").unwrap();
/// assert!(engine.is_in_state("screen:login"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LayerSpec {
    id: Option<String>,
    parent: Option<ParentRef>,
    attributes: Vec<Attribute>,
}

impl LayerSpec {
    /// Start an empty layer definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Element id; generated when omitted.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Parent layer id.
    pub fn parent(mut self, parent: impl Into<ParentRef>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Width in pixels or any CSS length.
    pub fn width(self, value: impl Into<Dimension>) -> Self {
        self.attribute(Attribute::Width(value.into()))
    }

    /// Height in pixels or any CSS length.
    pub fn height(self, value: impl Into<Dimension>) -> Self {
        self.attribute(Attribute::Height(value.into()))
    }

    /// Offset from the parent's top edge.
    pub fn top(self, value: impl Into<Dimension>) -> Self {
        self.attribute(Attribute::Top(value.into()))
    }

    /// Offset from the parent's left edge.
    pub fn left(self, value: impl Into<Dimension>) -> Self {
        self.attribute(Attribute::Left(value.into()))
    }

    /// Background image, sized by its `@Nx` density once loaded.
    pub fn image(self, source: impl Into<String>) -> Self {
        self.attribute(Attribute::Image(source.into()))
    }

    /// Set a state when clicked.
    pub fn click(self, state: &str) -> Self {
        self.attribute(Attribute::Click(Some(ClickAction::from(state))))
    }

    /// Run `callback` when the layer is clicked.
    pub fn on_click<F>(self, callback: F) -> Self
    where
        F: Fn(&mut dyn StateControl) -> Result<(), EngineError> + 'static,
    {
        self.attribute(Attribute::Click(Some(ClickAction::callback(callback))))
    }

    /// Comma separated state full names.
    pub fn visible(self, states: &str) -> Self {
        self.attribute(Attribute::Visible(Visibility::parse(states)))
    }

    /// Show the layer whatever the active states.
    pub fn always_visible(self) -> Self {
        self.attribute(Attribute::Visible(Visibility::Always))
    }

    /// Extra space-separated classes.
    pub fn class_name(self, classes: impl Into<String>) -> Self {
        self.attribute(Attribute::ClassName(classes.into()))
    }

    /// Fill the element from a template in the document.
    pub fn template(self, id: impl Into<String>) -> Self {
        self.attribute(Attribute::Template(id.into()))
    }

    /// Raw inner HTML for the element.
    pub fn html(self, html: impl Into<String>) -> Self {
        self.attribute(Attribute::Html(html.into()))
    }

    /// Toggle the debug outline.
    pub fn debug(self, on: bool) -> Self {
        self.attribute(Attribute::Debug(on))
    }

    /// Add any attribute. A `Parent` attribute sets the parent.
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        match attribute {
            Attribute::Parent(parent) => self.parent = Some(parent),
            other => self.attributes.push(other),
        }
        self
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Option<ParentRef>, Vec<Attribute>) {
        (self.id, self.parent, self.attributes)
    }
}
