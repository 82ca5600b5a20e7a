//! History entries and the snapshot payload they carry.

use super::error::PayloadError;
use crate::core::ActiveStateSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of the active-state set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// Active full names, in activation order
    pub states: Vec<String>,
}

impl Snapshot {
    /// Snapshot the active set into a new entry.
    pub fn capture(active: &ActiveStateSet) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            states: active.to_vec(),
        }
    }

    /// Serialize with bincode.
    pub fn encode(&self) -> Result<Vec<u8>, PayloadError> {
        bincode::serialize(self).map_err(|e| PayloadError::EncodingFailed(e.to_string()))
    }

    /// Deserialize, rejecting unknown versions.
    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        let snapshot: Snapshot =
            bincode::deserialize(bytes).map_err(|e| PayloadError::DecodingFailed(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PayloadError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}

/// State object stored with a navigation-stack entry.
///
/// The payload is opaque to the platform; only the engine decodes it.
///
/// # Example
///
/// ```rust
/// use clickthrough::core::ActiveStateSet;
/// use clickthrough::history::HistoryEntry;
///
/// let active: ActiveStateSet = ["screen:login"].into_iter().collect();
/// let entry = HistoryEntry::capture(&active).unwrap();
/// assert_eq!(entry.states().unwrap(), vec!["screen:login"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique entry identifier
    pub id: Uuid,

    /// When the entry was written
    pub recorded_at: DateTime<Utc>,

    payload: Vec<u8>,
}

impl HistoryEntry {
    /// Snapshot the active set into a new entry.
    pub fn capture(active: &ActiveStateSet) -> Result<Self, PayloadError> {
        Ok(Self::from_payload(Snapshot::capture(active).encode()?))
    }

    /// Wrap raw payload bytes, e.g. ones restored by a platform.
    pub fn from_payload(payload: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            payload,
        }
    }

    /// Encoded snapshot bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Decode the full names stored in this entry.
    pub fn states(&self) -> Result<Vec<String>, PayloadError> {
        Snapshot::decode(&self.payload).map(|snapshot| snapshot.states)
    }
}
