//! Per-aggregate mutation serialization.
//!
//! Two commands for the same release must not interleave between
//! load and save. Handlers take the aggregate's lease for the whole
//! load -> mutate -> persist -> emit span; commands for different
//! aggregates proceed in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of per-aggregate-id async mutexes.
#[derive(Default)]
pub struct AggregateLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl AggregateLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lease for one aggregate id, creating the mutex on
    /// first use. The returned guard holds the lease until dropped.
    pub async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let cell = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        cell.lock_owned().await
    }
}
