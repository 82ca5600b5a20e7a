//! Builder API for engines, layers and state trees.
//!
//! This module provides a fluent API for assembling a prototype:
//!
//! - [`EngineBuilder`]: configuration and observers, then `build`
//! - [`LayerSpec`]: attribute lists for [`Engine::add_layer`](crate::Engine::add_layer)
//! - [`state_tree!`](crate::state_tree): nested state declarations

mod engine;
mod layer;
#[macro_use]
mod macros;

pub use engine::EngineBuilder;
pub use layer::LayerSpec;
