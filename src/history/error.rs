//! History payload error types.

use thiserror::Error;

/// Errors that can occur while encoding or decoding a history payload
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// Snapshot could not be encoded
    #[error("Snapshot encoding failed: {0}")]
    EncodingFailed(String),

    /// Payload bytes are not a snapshot
    #[error("Snapshot decoding failed: {0}")]
    DecodingFailed(String),

    /// Snapshot was written by an incompatible version
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}
