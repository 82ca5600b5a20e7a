//! Engine error types.

use crate::core::TreeViolation;
use crate::history::PayloadError;
use thiserror::Error;

/// Errors raised by engine operations.
///
/// These are authoring mistakes: an unknown state name in a click target, two
/// layers with the same id, a parent that does not exist. They are reported
/// at the call site and never retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("Invalid state: {name}")]
    InvalidState { name: String },

    #[error("State '{full_name}' is already registered")]
    DuplicateStateRegistration { full_name: String },

    #[error("Layer id '{id}' already exists")]
    DuplicateLayerId { id: String },

    #[error("Invalid parent for layer '{layer}': {parent}")]
    UnresolvedParent { layer: String, parent: String },

    #[error("Unknown layer: {id}")]
    UnknownLayer { id: String },

    #[error("Attribute '{attribute}' can only be set when the layer is constructed")]
    ConstructionOnly { attribute: &'static str },

    #[error("Invalid state tree: {}", summarize(.violations))]
    InvalidStateTree { violations: Vec<TreeViolation> },

    #[error("History payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

fn summarize(violations: &[TreeViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<TreeViolation> for EngineError {
    fn from(violation: TreeViolation) -> Self {
        EngineError::InvalidStateTree {
            violations: vec![violation],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_errors_list_every_violation() {
        let error = EngineError::InvalidStateTree {
            violations: vec![
                TreeViolation::RootNotObject,
                TreeViolation::Duplicate {
                    full_name: "screen:home".to_string(),
                },
            ],
        };

        assert_eq!(
            error.to_string(),
            "Invalid state tree: State tree root must be an object; State 'screen:home' is declared more than once"
        );
    }

    #[test]
    fn payload_errors_convert() {
        let error: EngineError = PayloadError::DecodingFailed("eof".to_string()).into();
        assert!(matches!(error, EngineError::Payload(_)));
    }
}
