//! Shared handle to the currently loaded snapshot.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::engine::SearchSnapshot;

/// Thread-safe holder of the active [`SearchSnapshot`].
///
/// Readers clone an `Arc` and query without holding the lock. Publishing a
/// new snapshot swaps the pointer; readers that already hold the old one keep
/// a consistent view until they drop it.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    current: Arc<RwLock<Option<Arc<SearchSnapshot>>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active snapshot and returns a handle to it.
    pub fn publish(&self, snapshot: SearchSnapshot) -> Arc<SearchSnapshot> {
        let snapshot = Arc::new(snapshot);
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&snapshot));
        info!(
            records = snapshot.total_records(),
            columns = snapshot.table().columns.len(),
            "published snapshot"
        );
        snapshot
    }

    /// Builds a snapshot outside the lock and publishes it on success. On
    /// failure the previous snapshot stays active.
    pub fn load_with<F, E>(&self, build: F) -> std::result::Result<Arc<SearchSnapshot>, E>
    where
        F: FnOnce() -> std::result::Result<SearchSnapshot, E>,
    {
        let snapshot = build()?;
        Ok(self.publish(snapshot))
    }

    pub fn current(&self) -> Option<Arc<SearchSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    /// Drops the active snapshot. Returns whether one was loaded.
    pub fn clear(&self) -> bool {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            info!("cleared snapshot");
        }
        previous.is_some()
    }
}
