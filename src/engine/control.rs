use super::EngineError;

/// The state operations available to click callbacks.
///
/// Callbacks receive the engine as `&mut dyn StateControl` so they can drive
/// transitions without naming the platform type.
pub trait StateControl {
    fn set_state(&mut self, full_name: &str) -> Result<(), EngineError>;

    fn remove_state(&mut self, full_name: &str) -> Result<(), EngineError>;

    fn is_in_state(&self, full_name: &str) -> bool;

    fn has_state(&self, full_name: &str) -> bool;
}
