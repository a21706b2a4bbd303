//! Duplicate-delivery suppression.
//!
//! The transport may redeliver the same message event; membership in this
//! set means the job is currently between accepted and terminated, and a
//! second delivery must be ignored. Valid only within a single process.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::pipeline::job::JobKey;

/// Set of in-flight job identifiers with insert-if-absent semantics.
#[derive(Debug, Default)]
pub struct ProcessingSet {
    inner: Mutex<HashSet<JobKey>>,
}

impl ProcessingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key if absent. Returns `false` when the key is already in
    /// flight, i.e. this delivery is a duplicate.
    pub fn insert(&self, key: JobKey) -> bool {
        self.lock().insert(key)
    }

    /// Remove a key at job termination. Returns whether it was present.
    pub fn remove(&self, key: &JobKey) -> bool {
        self.lock().remove(key)
    }

    /// Check membership.
    pub fn contains(&self, key: &JobKey) -> bool {
        self.lock().contains(key)
    }

    /// Number of jobs currently in flight.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<JobKey>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
