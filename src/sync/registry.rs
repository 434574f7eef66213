//! PR → thread mapping.
//!
//! The registry is the single source of truth for "does this PR already have
//! a thread". Records are created once, after the thread exists and its intro
//! message was posted, and are never removed: archived threads keep their
//! record so a later `reopened` event finds them.
//!
//! The shipped [`InMemoryRegistry`] loses its contents on restart. Anything
//! durable only needs to implement [`ThreadRegistry`].

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{PrId, PrNumber, ThreadId};

/// The thread tracking one pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub thread_id: ThreadId,
    pub pr_number: PrNumber,
}

/// Errors from registry writes.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A record already exists for this PR. The existing record is kept.
    #[error("PR id {pr_id} already has thread {existing}")]
    AlreadyRecorded { pr_id: PrId, existing: ThreadId },
}

/// Storage for PR → thread records.
pub trait ThreadRegistry: Send + Sync {
    /// Returns the record for `pr_id`, if one exists.
    fn lookup(&self, pr_id: PrId) -> Option<ThreadRecord>;

    /// Inserts the record for `pr_id`.
    ///
    /// Fails with [`RegistryError::AlreadyRecorded`] if the PR already has one.
    fn record(&self, pr_id: PrId, record: ThreadRecord) -> Result<(), RegistryError>;
}

/// Process-local registry.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    records: RwLock<HashMap<PrId, ThreadRecord>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked pull requests.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ThreadRegistry for InMemoryRegistry {
    fn lookup(&self, pr_id: PrId) -> Option<ThreadRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&pr_id)
            .cloned()
    }

    fn record(&self, pr_id: PrId, record: ThreadRecord) -> Result<(), RegistryError> {
        let mut records = self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = records.get(&pr_id) {
            return Err(RegistryError::AlreadyRecorded {
                pr_id,
                existing: existing.thread_id.clone(),
            });
        }
        records.insert(pr_id, record);
        Ok(())
    }
}
