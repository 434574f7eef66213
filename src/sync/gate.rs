//! Per-PR mutual exclusion.
//!
//! Two deliveries for the same PR (a retried `opened`, or `opened` racing
//! `synchronize`) must not both observe "no thread yet" and both create one.
//! The synchronizer holds a [`PrGate`] permit for the whole
//! lookup-or-create-then-update sequence. Different PRs never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::types::PrId;

/// A set of async locks keyed by PR id.
#[derive(Debug, Default)]
pub struct PrGate {
    locks: Mutex<HashMap<PrId, Arc<AsyncMutex<()>>>>,
}

/// Held while a PR's thread is being synchronized.
pub type PrPermit = OwnedMutexGuard<()>;

impl PrGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task holds the permit for `pr_id`, then takes it.
    ///
    /// Entries nobody holds or waits on are pruned here, so the map only
    /// grows with the number of PRs being synchronized at once.
    pub async fn acquire(&self, pr_id: PrId) -> PrPermit {
        // The std lock is only held to clone the Arc, never across an await.
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Holders and waiters keep their own clone, so a count of one is idle.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(pr_id).or_default())
        };
        lock.lock_owned().await
    }
}
