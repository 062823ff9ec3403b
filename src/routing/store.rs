//! Versioned route-table snapshots.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::Mutex;

use crate::routing::table::RouteTable;

/// An immutable, versioned view of the committed route table.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub version: u64,
    pub table: Arc<RouteTable>,
}

/// Holder of the committed route table.
///
/// Readers load the current snapshot lock-free. Commits are serialized by a
/// single mutex and only succeed against the version they were computed from.
#[derive(Debug, Default)]
pub struct RouteStore {
    current: ArcSwap<Snapshot>,
    commit_lock: Mutex<()>,
}

impl RouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current committed snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Replace the table if nobody committed since `expected_version`.
    ///
    /// Returns the new version, or `None` when the snapshot moved on.
    pub async fn commit(&self, expected_version: u64, table: RouteTable) -> Option<u64> {
        let _guard = self.commit_lock.lock().await;
        let current = self.current.load();
        if current.version != expected_version {
            return None;
        }
        let version = current.version + 1;
        self.current.store(Arc::new(Snapshot {
            version,
            table: Arc::new(table),
        }));
        Some(version)
    }
}
