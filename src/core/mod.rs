//! Core state bookkeeping.
//!
//! This module contains the pure part of the engine:
//! - `State` records and their naming rules
//! - The nested default-state tree and its validation
//! - The registry with its active-state set and exclusivity rules
//! - The orientation slot
//!
//! Nothing here touches the document, history or observers; the engine
//! drives those effects from the answers this module gives.

mod orientation;
mod registry;
mod state;
mod tree;

pub use orientation::{Orientation, OrientationChange, OrientationSlot};
pub use registry::{ActiveStateSet, StateRegistry};
pub use state::{State, ORIENTATION_GROUP};
pub use tree::{StateNode, StateTree, TreeLeaf, TreeViolation};
