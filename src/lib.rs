//! Clickthrough: an engine for click-through prototypes
//!
//! A prototype is a tree of positioned layers shown or hidden by a small state
//! machine. Moving between screens is nothing but a state transition, and
//! every transition is mirrored into browser history and the URL so back,
//! forward and deep links behave.
//!
//! The crate follows a "pure core, imperative shell" split. The registry,
//! state tree, orientation slot and visibility rule are plain data with no
//! side effects; the [`Engine`] drives them and projects the result onto a
//! [`Platform`](platform::Platform).
//!
//! # Core Concepts
//!
//! - **States**: grouped names; at most one state per group is active
//! - **History**: each transition pushes an entry carrying a snapshot of the
//!   active states and a `?a,b` query
//! - **Visibility**: one compiled CSS rule pairs body classes with layer
//!   companion classes, so transitions never touch layers
//! - **Layers**: declarative attribute lists, projected onto elements
//! - **Notifications**: synchronous `StateSet`/`StateRemoved` broadcasts
//!
//! # Example
//!
//! ```rust
//! use clickthrough::platform::Navigation;
//! use clickthrough::{state_tree, EngineBuilder, LayerSpec, MemoryPlatform};
//!
//! let tree = state_tree! {
//!     screen: { welcome: true, login: false },
//!     menu: false,
//! };
//! let mut engine = EngineBuilder::new()
//!     .build(MemoryPlatform::new(), tree)
//!     .unwrap();
//!
//! engine
//!     .add_layer(
//!         LayerSpec::new()
//!             .id("Welcome")
//!             .visible("screen:welcome")
//!             .click("screen:login"),
//!     )
//!     .unwrap();
//!
//! engine.click("Welcome").unwrap();
//! assert!(engine.is_in_state("screen:login"));
//! assert_eq!(engine.platform().location_search(), "?screen:login");
//! assert!(!engine.is_layer_visible("Welcome").unwrap());
//! ```

pub mod builder;
pub mod core;
pub mod effects;
pub mod engine;
pub mod history;
pub mod layer;
pub mod notify;
pub mod platform;
pub mod visibility;

// Re-export commonly used types
pub use builder::{EngineBuilder, LayerSpec};
pub use core::{Orientation, State, StateRegistry, StateTree};
pub use engine::{Engine, EngineConfig, EngineError, StateControl};
pub use layer::{Attribute, ClickAction, Dimension, Extent, Visibility};
pub use notify::{Notification, ObserverId};
pub use platform::MemoryPlatform;
