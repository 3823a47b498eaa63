//! Assignment Store Module
//!
//! Durable subject-scoped mapping `(experiment, subject) -> variant id`.
//! The engine reads it before every weighted pick and writes it once per
//! subject, which is what makes assignments sticky.
//!
//! Backends:
//! - [`MemoryAssignmentStore`]: `DashMap`, lost on process restart
//! - [`FileAssignmentStore`]: JSON file, survives restarts
//!
//! # Example
//!
//! ```rust
//! use abtest_engine::store::{assignment_key, AssignmentStore, MemoryAssignmentStore};
//!
//! # fn example() -> abtest_engine::Result<()> {
//! let store = MemoryAssignmentStore::new();
//! let key = assignment_key("ab_test", "quiz-length", "user-42");
//!
//! store.set(&key, "short")?;
//! assert_eq!(store.get(&key)?, Some("short".to_string()));
//!
//! store.clear_all()?;
//! assert_eq!(store.get(&key)?, None);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod file;
mod memory;

pub use file::FileAssignmentStore;
pub use memory::MemoryAssignmentStore;

use crate::Result;
use std::sync::Arc;

/// Build the composite store key for one `(experiment, subject)` pair.
#[must_use]
pub fn assignment_key(prefix: &str, experiment_id: &str, subject_id: &str) -> String {
    format!("{prefix}:{experiment_id}:{subject_id}")
}

/// Storage for sticky variant assignments.
///
/// Values are variant ids. Implementations must be safe to share across
/// threads; concurrent first-time writes for the same key are last-write-wins.
pub trait AssignmentStore: Send + Sync {
    /// Get the variant id stored under `key`.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a variant id under `key`, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError`/`Io` if the backend cannot be written.
    fn set(&self, key: &str, variant_id: &str) -> Result<()>;

    /// Remove every assignment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError`/`Io` if the backend cannot be written.
    fn clear_all(&self) -> Result<()>;

    /// Get multiple keys in a batch.
    ///
    /// Returns values in the same order as keys. Missing keys return `None`.
    ///
    /// # Errors
    ///
    /// Returns the first error hit by [`AssignmentStore::get`].
    fn batch_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        keys.iter().map(|key| self.get(key)).collect()
    }
}

impl<S: AssignmentStore + ?Sized> AssignmentStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, variant_id: &str) -> Result<()> {
        (**self).set(key, variant_id)
    }

    fn clear_all(&self) -> Result<()> {
        (**self).clear_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_key_format() {
        assert_eq!(assignment_key("ab_test", "exp", "user"), "ab_test:exp:user");
    }

    #[test]
    fn test_memory_store_set_get() {
        let store = MemoryAssignmentStore::new();

        store.set("key1", "control").unwrap();
        assert_eq!(store.get("key1").unwrap(), Some("control".to_string()));
    }

    #[test]
    fn test_memory_store_get_nonexistent() {
        let store = MemoryAssignmentStore::new();
        assert_eq!(store.get("nonexistent").unwrap(), None);
    }

    #[test]
    fn test_memory_store_overwrite() {
        let store = MemoryAssignmentStore::new();

        store.set("key", "a").unwrap();
        store.set("key", "b").unwrap();

        assert_eq!(store.get("key").unwrap(), Some("b".to_string()));
    }

    #[test]
    fn test_memory_store_clear_all() {
        let store = MemoryAssignmentStore::new();

        store.set("key1", "a").unwrap();
        store.set("key2", "b").unwrap();
        assert_eq!(store.len(), 2);

        store.clear_all().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.get("key1").unwrap(), None);
    }

    #[test]
    fn test_memory_store_batch_get() {
        let store = MemoryAssignmentStore::new();

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        // "c" intentionally not set

        let results = store.batch_get(&["a", "b", "c"]).unwrap();

        assert_eq!(
            results,
            vec![Some("1".to_string()), Some("2".to_string()), None]
        );
    }

    #[test]
    fn test_arc_store_shares_state() {
        let store = Arc::new(MemoryAssignmentStore::new());
        let handle = Arc::clone(&store);

        handle.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_memory_store_concurrent_access() {
        let store = Arc::new(MemoryAssignmentStore::new());

        // Spawn 16 concurrent writers
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.set(&format!("key{i}"), &format!("v{i}")).unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..16 {
            assert_eq!(
                store.get(&format!("key{i}")).unwrap(),
                Some(format!("v{i}"))
            );
        }
    }
}
