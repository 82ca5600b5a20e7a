//! Device orientation as a single-slot pseudo-state.
//!
//! Orientation lives outside the active-state set: it is never written to
//! history or the URL and is not subject to group exclusivity. The slot holds
//! at most one value and swapping to the value it already holds is a no-op.

use super::state::ORIENTATION_GROUP;
use serde::{Deserialize, Serialize};

/// Portrait or landscape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// State name within the orientation group.
    pub fn name(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }

    /// Registry full name, e.g. `orientation:portrait`.
    pub fn full_name(self) -> String {
        format!("{ORIENTATION_GROUP}:{}", self.name())
    }

    /// The other orientation.
    pub fn opposite(self) -> Self {
        match self {
            Self::Portrait => Self::Landscape,
            Self::Landscape => Self::Portrait,
        }
    }

    /// Parse `portrait` or `landscape`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "portrait" => Some(Self::Portrait),
            "landscape" => Some(Self::Landscape),
            _ => None,
        }
    }

    /// Derive orientation from a device rotation angle in degrees.
    ///
    /// Only a quarter turn either way counts as landscape.
    pub fn from_angle(angle: i32) -> Self {
        if angle.abs() == 90 {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }
}

/// A swap performed on the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrientationChange {
    pub previous: Option<Orientation>,
    pub current: Orientation,
}

impl OrientationChange {
    /// The orientation whose class is taken off the body.
    pub fn displaced(&self) -> Orientation {
        self.current.opposite()
    }
}

/// Holds the current orientation, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrientationSlot {
    current: Option<Orientation>,
}

impl OrientationSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The orientation held, if any.
    pub fn get(&self) -> Option<Orientation> {
        self.current
    }

    /// Whether the slot holds the orientation with this full name.
    pub fn holds(&self, full_name: &str) -> bool {
        self.current
            .is_some_and(|orientation| orientation.full_name() == full_name)
    }

    /// Store `next`, returning the change, or `None` when nothing changed.
    pub fn swap(&mut self, next: Orientation) -> Option<OrientationChange> {
        if self.current == Some(next) {
            return None;
        }
        let previous = self.current.replace(next);
        Some(OrientationChange {
            previous,
            current: next,
        })
    }

    /// Empty the slot, returning what it held.
    pub fn clear(&mut self) -> Option<Orientation> {
        self.current.take()
    }
}
