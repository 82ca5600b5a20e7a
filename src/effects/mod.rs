//! Image preloading as effects.
//!
//! Preloading is the one asynchronous step in an otherwise synchronous engine.
//! It is modelled with Stillwater 0.11 effects so the pure layer bookkeeping
//! stays separate from the I/O:
//!
//! - [`ImageLoader`] is the effect environment (a real decoder, or
//!   [`MemoryImageLoader`] in tests)
//! - [`preload`] builds a `BoxedEffect` that reads one image's natural size
//! - the engine runs pending effects and applies the outcome to the layer

mod preload;

pub use preload::{
    parse_density, preload, ImageError, ImageLoader, LoadToken, MemoryImageLoader, NaturalSize,
    PendingImage,
};
