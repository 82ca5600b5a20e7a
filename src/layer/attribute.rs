//! Tagged layer attributes.

use crate::engine::{EngineError, StateControl};
use std::fmt;
use std::rc::Rc;

/// A geometry value.
///
/// Numbers are pixels; strings pass through to CSS untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum Dimension {
    Px(f64),
    Css(String),
}

impl Dimension {
    /// CSS value, `px` appended to pixel values.
    pub fn to_css(&self) -> String {
        match self {
            Self::Px(px) => format!("{px}px"),
            Self::Css(raw) => raw.clone(),
        }
    }

    /// Pixel value, if this is one.
    pub fn as_px(&self) -> Option<f64> {
        match self {
            Self::Px(px) => Some(*px),
            Self::Css(_) => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl From<f64> for Dimension {
    fn from(px: f64) -> Self {
        Self::Px(px)
    }
}

impl From<i32> for Dimension {
    fn from(px: i32) -> Self {
        Self::Px(f64::from(px))
    }
}

impl From<u32> for Dimension {
    fn from(px: u32) -> Self {
        Self::Px(f64::from(px))
    }
}

impl From<&str> for Dimension {
    fn from(raw: &str) -> Self {
        Self::Css(raw.to_string())
    }
}

impl From<String> for Dimension {
    fn from(raw: String) -> Self {
        Self::Css(raw)
    }
}

/// A size read that may precede image loading.
#[derive(Clone, Debug, PartialEq)]
pub enum Extent {
    /// Not set, and no image has reported a size yet.
    Unknown,
    Known(Dimension),
}

impl Extent {
    /// Whether a size has been assigned.
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// The assigned dimension, if any.
    pub fn dimension(&self) -> Option<&Dimension> {
        match self {
            Self::Known(dimension) => Some(dimension),
            Self::Unknown => None,
        }
    }

    /// Pixel size, if known and in pixels.
    pub fn px(&self) -> Option<f64> {
        self.dimension().and_then(Dimension::as_px)
    }
}

/// When a layer is shown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Always,
    /// Shown while any of these states is active.
    States(Vec<String>),
}

impl Visibility {
    /// Parse a comma separated list of state full names.
    pub fn parse(list: &str) -> Self {
        Self::States(
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl From<&str> for Visibility {
    fn from(list: &str) -> Self {
        Self::parse(list)
    }
}

pub type ClickCallback = Rc<dyn Fn(&mut dyn StateControl) -> Result<(), EngineError>>;

/// What a click does.
#[derive(Clone)]
pub enum ClickAction {
    /// Set this state.
    Transition(String),
    Callback(ClickCallback),
}

impl ClickAction {
    /// Wrap a closure as a click action.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&mut dyn StateControl) -> Result<(), EngineError> + 'static,
    {
        Self::Callback(Rc::new(f))
    }

    pub(crate) fn run(&self, control: &mut dyn StateControl) -> Result<(), EngineError> {
        match self {
            Self::Transition(state) => control.set_state(state),
            Self::Callback(callback) => callback(control),
        }
    }
}

impl fmt::Debug for ClickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transition(state) => f.debug_tuple("Transition").field(state).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl From<&str> for ClickAction {
    fn from(state: &str) -> Self {
        Self::Transition(state.to_string())
    }
}

/// A parent reference, resolved once at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParentRef {
    Canvas,
    Layer(String),
}

impl From<&str> for ParentRef {
    fn from(id: &str) -> Self {
        Self::Layer(id.to_string())
    }
}

impl From<String> for ParentRef {
    fn from(id: String) -> Self {
        Self::Layer(id)
    }
}

/// One attribute update, projected onto the rendered element when applied.
#[derive(Clone, Debug)]
pub enum Attribute {
    Width(Dimension),
    Height(Dimension),
    Top(Dimension),
    Left(Dimension),
    /// Image source; starts a preload.
    Image(String),
    /// `None` leaves existing handlers in place.
    Click(Option<ClickAction>),
    Visible(Visibility),
    /// Whitespace separated classes, added to the ones already present.
    ClassName(String),
    /// Id of a template whose content is appended.
    Template(String),
    Html(String),
    Debug(bool),
    /// Only valid at construction.
    Parent(ParentRef),
}

impl Attribute {
    /// Attribute name as written in layer definitions.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Width(_) => "width",
            Self::Height(_) => "height",
            Self::Top(_) => "top",
            Self::Left(_) => "left",
            Self::Image(_) => "image",
            Self::Click(_) => "click",
            Self::Visible(_) => "visible",
            Self::ClassName(_) => "class_name",
            Self::Template(_) => "template",
            Self::Html(_) => "html",
            Self::Debug(_) => "debug",
            Self::Parent(_) => "parent",
        }
    }
}
