//! Registry for externally computed recursive directory sizes.
//!
//! The actual computation happens in a separate collaborator; the list only
//! starts and cancels requests and reads published results when a
//! `DirectorySizeChanged` signal arrives. Requests are keyed by
//! `(list instance, path)` so cancelling one list leaves the other pane's
//! computations running.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Result of a recursive directory size computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageResult {
    /// Number of objects in the subtree.
    pub item_count: u64,
    /// Total size of the subtree in bytes.
    pub total_size: u64,
}

/// Shared registry of outstanding and completed size computations.
#[derive(Debug, Default)]
pub struct UsageRegistry {
    results: Mutex<HashMap<(u64, PathBuf), UsageResult>>,
}

impl UsageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request so it can be cancelled per instance later.
    pub fn begin(&self, instance: u64, path: &Path) {
        self.results
            .lock()
            .expect("usage registry poisoned")
            .entry((instance, path.to_path_buf()))
            .or_default();
    }

    /// Publish a computed (or partial) result for a request.
    pub fn publish(&self, instance: u64, path: &Path, result: UsageResult) {
        self.results
            .lock()
            .expect("usage registry poisoned")
            .insert((instance, path.to_path_buf()), result);
    }

    /// Look up the latest published result for a request.
    pub fn get(&self, instance: u64, path: &Path) -> Option<UsageResult> {
        self.results
            .lock()
            .expect("usage registry poisoned")
            .get(&(instance, path.to_path_buf()))
            .copied()
    }

    /// Drop every request belonging to one list instance, leaving other
    /// instances untouched.
    pub fn cancel_for_instance(&self, instance: u64) {
        self.results
            .lock()
            .expect("usage registry poisoned")
            .retain(|(owner, _), _| *owner != instance);
    }
}
