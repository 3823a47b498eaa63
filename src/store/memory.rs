//! In-memory assignment store using `DashMap`.
//!
//! This is the default backend - assignments are lost on process restart.
//! For persistence, use [`super::FileAssignmentStore`].

use super::AssignmentStore;
use crate::Result;
use dashmap::DashMap;

/// In-memory assignment store using lock-free concurrent hashmap.
///
/// # Example
///
/// ```rust
/// use abtest_engine::store::{AssignmentStore, MemoryAssignmentStore};
///
/// let store = MemoryAssignmentStore::new();
/// store.set("ab_test:exp:user-1", "control").unwrap();
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryAssignmentStore {
    store: DashMap<String, String>,
}

impl MemoryAssignmentStore {
    /// Create a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: DashMap::with_capacity(capacity),
        }
    }

    /// Get the number of stored assignments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl AssignmentStore for MemoryAssignmentStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.store.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, variant_id: &str) -> Result<()> {
        self.store.insert(key.to_string(), variant_id.to_string());
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        self.store.clear();
        Ok(())
    }
}
