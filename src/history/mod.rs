//! History and URL synchronization.
//!
//! Every genuine transition writes a [`HistoryEntry`] whose opaque payload is
//! a snapshot of the active set, together with a query string listing the
//! same names. On back/forward navigation the payload is preferred; the query
//! string is the fallback for fresh page loads and foreign entries.
//!
//! # Example
//!
//! ```rust
//! use clickthrough::core::ActiveStateSet;
//! use clickthrough::history::{resolve_target, HistoryEntry};
//!
//! let active: ActiveStateSet = ["screen:likes"].into_iter().collect();
//! let entry = HistoryEntry::capture(&active).unwrap();
//!
//! // The payload wins over the URL.
//! let target = resolve_target(Some(&entry), "?screen:home");
//! assert_eq!(target, Some(vec!["screen:likes".to_string()]));
//!
//! // Without an entry the URL is parsed.
//! let target = resolve_target(None, "?screen:home");
//! assert_eq!(target, Some(vec!["screen:home".to_string()]));
//! ```

mod entry;
pub mod error;
mod query;

pub use entry::{HistoryEntry, Snapshot, SNAPSHOT_VERSION};
pub use error::PayloadError;
pub use query::{parse_query, to_query};

use tracing::warn;

/// Work out which states a navigation should restore.
///
/// `None` means the navigation carries no override and the current states
/// stay as they are.
pub fn resolve_target(entry: Option<&HistoryEntry>, search: &str) -> Option<Vec<String>> {
    if let Some(entry) = entry {
        match entry.states() {
            Ok(states) => return Some(states),
            Err(e) => warn!(entry = %entry.id, error = %e, "Unreadable history payload, falling back to URL"),
        }
    }
    parse_query(search)
}
