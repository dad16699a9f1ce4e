//! Record of session ids that have already been reported.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::StoreError;

/// Lookup/insert contract for the dedup store.
///
/// The filter only ever calls `contains`; `mark_seen` belongs to whoever
/// delivered the notification. Implementations must be safe to share
/// between concurrent poll cycles.
pub trait DedupStore: Send + Sync {
    fn contains(&self, session_id: &str) -> Result<bool, StoreError>;

    /// Idempotent: marking an already-seen id is not an error.
    fn mark_seen(&self, session_id: &str) -> Result<(), StoreError>;

    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Forget every recorded id.
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory store. State is lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryDedupStore {
    seen: Mutex<HashSet<String>>,
}

impl MemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DedupStore for MemoryDedupStore {
    fn contains(&self, session_id: &str) -> Result<bool, StoreError> {
        let seen = self.seen.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(seen.contains(session_id))
    }

    fn mark_seen(&self, session_id: &str) -> Result<(), StoreError> {
        let mut seen = self.seen.lock().map_err(|_| StoreError::Poisoned)?;
        seen.insert(session_id.to_string());
        Ok(())
    }

    fn len(&self) -> Result<usize, StoreError> {
        let seen = self.seen.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(seen.len())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.seen.lock().map_err(|_| StoreError::Poisoned)?.clear();
        Ok(())
    }
}
