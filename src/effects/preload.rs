//! The preload effect and its environment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;
use thiserror::Error;
use uuid::Uuid;

/// Intrinsic pixel size of a decoded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalSize {
    pub width: u32,
    pub height: u32,
}

impl NaturalSize {
    /// Pixel size as decoded from the file.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// CSS pixel size at the given device density.
    pub fn scaled(self, density: u32) -> (f64, f64) {
        let density = f64::from(density.max(1));
        (
            f64::from(self.width) / density,
            f64::from(self.height) / density,
        )
    }
}

/// Why an image never produced a size.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ImageError {
    #[error("Image not found: {image}")]
    NotFound { image: String },

    #[error("Image '{image}' could not be decoded: {reason}")]
    Decode { image: String, reason: String },

    #[error("Image '{image}' did not load within {waited_ms}ms")]
    TimedOut { image: String, waited_ms: u64 },
}

/// Identifies one preload request.
///
/// Assigning a new image to a layer issues a new token; completions carrying
/// an older token are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadToken(Uuid);

impl LoadToken {
    /// A fresh, unique token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LoadToken {
    fn default() -> Self {
        Self::new()
    }
}

/// A preload waiting for its result.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingImage {
    pub layer: String,
    pub token: LoadToken,
    pub image: String,
    pub requested_at: DateTime<Utc>,
}

/// Environment for [`preload`] effects.
pub trait ImageLoader: Clone + Send + Sync + 'static {
    fn load(&self, image: &str) -> Result<NaturalSize, ImageError>;
}

/// Image sizes held in memory.
///
/// ```rust
/// use clickthrough::effects::{ImageLoader, MemoryImageLoader, NaturalSize};
///
/// let loader = MemoryImageLoader::new().with("img/logo@2x.png", 400, 120);
/// assert_eq!(loader.load("img/logo@2x.png"), Ok(NaturalSize::new(400, 120)));
/// assert!(loader.load("img/missing.png").is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryImageLoader {
    sizes: Arc<HashMap<String, NaturalSize>>,
}

impl MemoryImageLoader {
    /// A loader that knows no images.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image with its natural size.
    pub fn with(mut self, image: &str, width: u32, height: u32) -> Self {
        Arc::make_mut(&mut self.sizes).insert(image.to_string(), NaturalSize::new(width, height));
        self
    }
}

impl ImageLoader for MemoryImageLoader {
    fn load(&self, image: &str) -> Result<NaturalSize, ImageError> {
        self.sizes
            .get(image)
            .copied()
            .ok_or_else(|| ImageError::NotFound {
                image: image.to_string(),
            })
    }
}

/// Read the device density from an `@<N>x.` marker in the file name.
///
/// Images without a marker, or with `@0x`, are density 1.
pub fn parse_density(image: &str) -> u32 {
    let Some(at) = image.rfind('@') else {
        return 1;
    };
    let rest = &image[at + 1..];
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() || !rest[digits.len()..].starts_with("x.") {
        return 1;
    }
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => 1,
        Ok(density) => density,
    }
}

/// Effect that reads the natural size of `image` from the loader.
pub fn preload<L: ImageLoader>(image: &str) -> BoxedEffect<NaturalSize, ImageError, L> {
    let image = image.to_string();
    from_fn(move |loader: &L| loader.load(&image)).boxed()
}
