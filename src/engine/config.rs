//! Engine configuration.

use super::EngineError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Size given to unset dimensions when an image never loads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FallbackSize {
    pub width: f64,
    pub height: f64,
}

/// Naming and timing knobs for an [`Engine`](super::Engine).
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```rust
/// use clickthrough::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{"class_prefix": "proto"}"#).unwrap();
/// assert_eq!(config.layer_class(), "proto-layer");
/// assert_eq!(config.visible_suffix, "--visible");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prefix of engine-owned classes and generated layer ids.
    pub class_prefix: String,
    /// Appended to a state's class to form the layer companion class.
    pub visible_suffix: String,
    /// Element id of the root layer.
    pub canvas_id: String,
    /// How long a preload may stay pending before it is expired.
    pub image_timeout_ms: u64,
    pub image_fallback: FallbackSize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            class_prefix: "clickthrough".to_string(),
            visible_suffix: "--visible".to_string(),
            canvas_id: "Canvas".to_string(),
            image_timeout_ms: 10_000,
            image_fallback: FallbackSize::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config, filling unset fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Reject values that would produce unusable class names or ids.
    pub fn check(&self) -> Result<(), EngineError> {
        if self.class_prefix.trim().is_empty() {
            return Err(EngineError::Config("class_prefix must not be empty".into()));
        }
        if self.visible_suffix.is_empty() {
            return Err(EngineError::Config("visible_suffix must not be empty".into()));
        }
        if self.canvas_id.trim().is_empty() {
            return Err(EngineError::Config("canvas_id must not be empty".into()));
        }
        Ok(())
    }

    /// Class every layer element carries.
    pub fn layer_class(&self) -> String {
        format!("{}-layer", self.class_prefix)
    }

    /// Body class on devices that report an orientation.
    pub fn mobile_class(&self) -> String {
        format!("{}-mobile", self.class_prefix)
    }

    /// Body class everywhere else.
    pub fn desktop_class(&self) -> String {
        format!("{}-desktop", self.class_prefix)
    }

    /// Id for the `n`th layer created without one.
    pub fn generated_id(&self, n: usize) -> String {
        format!("{}-{n}", self.class_prefix)
    }

    /// Pending image timeout as a `Duration`.
    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.canvas_id, "Canvas");
        assert_eq!(config.mobile_class(), "clickthrough-mobile");
        assert_eq!(config.generated_id(3), "clickthrough-3");
        assert_eq!(config.image_timeout(), Duration::from_secs(10));
        assert_eq!(config.image_fallback, FallbackSize::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            EngineConfig::from_json(r#"{"image_fallback": {"width": 320, "height": 480}}"#)
                .unwrap();
        assert_eq!(config.class_prefix, "clickthrough");
        assert_eq!(config.image_fallback.width, 320.0);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            EngineConfig::from_json("{"),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn empty_prefix_is_rejected() {
        assert!(EngineConfig::from_json(r#"{"class_prefix": ""}"#).is_err());
    }
}
