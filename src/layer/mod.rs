//! The declarative layer model.
//!
//! A layer is a positioned element under the canvas. It is built from a list
//! of [`Attribute`]s merged over defaults, and every later attribute write is
//! projected straight onto the element. Visibility is not computed per layer:
//! a layer only carries companion classes and the compiled rule does the rest.

mod attribute;
mod node;

pub use attribute::{
    Attribute, ClickAction, ClickCallback, Dimension, Extent, ParentRef, Visibility,
};
pub use node::{ImagePhase, Layer};

pub(crate) use node::AttributeContext;
