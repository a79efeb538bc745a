//! # Warnings Publisher
//!
//! Holds the most recently computed [`WarningsSet`].
//!
//! ## Thread Safety
//!
//! The current snapshot is an `Arc<WarningsSet>` behind a lock that is only
//! held to clone or swap the pointer. A reader either gets the old `Arc` or
//! the new one, never a mix of entries. Snapshots are never mutated after
//! publication.
//!
//! Each snapshot carries the state epoch it was computed from. A snapshot
//! older than the one already published is dropped, so racing recomputes
//! cannot roll the published view back.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::detection::WarningsSet;

struct Published {
    epoch: u64,
    warnings: Arc<WarningsSet>,
}

/// Atomic holder of the current warnings snapshot.
pub struct WarningsPublisher {
    current: RwLock<Published>,
}

impl WarningsPublisher {
    /// Creates a publisher holding an empty snapshot at epoch 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Published {
                epoch: 0,
                warnings: Arc::new(WarningsSet::new()),
            }),
        }
    }

    /// Replaces the current snapshot unconditionally.
    pub fn publish(&self, snapshot: WarningsSet) {
        let mut current = self.current.write();
        current.warnings = Arc::new(snapshot);
    }

    /// Replaces the current snapshot if `epoch` is not older than the
    /// published one.
    ///
    /// Returns whether the snapshot was accepted.
    pub fn publish_at(&self, epoch: u64, snapshot: WarningsSet) -> bool {
        let snapshot = Arc::new(snapshot);
        let mut current = self.current.write();
        if epoch < current.epoch {
            tracing::debug!(epoch, published = current.epoch, "dropping stale warnings snapshot");
            return false;
        }
        current.epoch = epoch;
        current.warnings = snapshot;
        true
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<WarningsSet> {
        Arc::clone(&self.current.read().warnings)
    }

    /// Epoch of the latest published snapshot.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.current.read().epoch
    }
}

impl Default for WarningsPublisher {
    fn default() -> Self {
        Self::new()
    }
}
