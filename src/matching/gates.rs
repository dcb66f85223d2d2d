use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use uuid::Uuid;

/// One async RwLock per delivery. Mutations hold it exclusively, composite
/// reads of a single delivery hold it shared, and unrelated deliveries never
/// contend. Gates are created lazily and kept for the life of the process;
/// a tombstoned delivery's gate is a few idle bytes.
pub struct DeliveryGates {
    locks: DashMap<Uuid, Arc<RwLock<()>>>,
}

impl DeliveryGates {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    // The map guard is dropped before any await: clone the Arc out first.
    fn gate(&self, delivery_id: Uuid) -> Arc<RwLock<()>> {
        self.locks
            .entry(delivery_id)
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    pub async fn exclusive(&self, delivery_id: Uuid) -> OwnedRwLockWriteGuard<()> {
        self.gate(delivery_id).write_owned().await
    }

    pub async fn shared(&self, delivery_id: Uuid) -> OwnedRwLockReadGuard<()> {
        self.gate(delivery_id).read_owned().await
    }
}

impl Default for DeliveryGates {
    fn default() -> Self {
        Self::new()
    }
}
