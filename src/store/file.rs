//! File-backed assignment store.
//!
//! Keeps the whole mapping in memory and rewrites a JSON object on every
//! mutation. The write goes to a sibling temp file first and is renamed
//! over the target, so a crash mid-write leaves the previous snapshot.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::AssignmentStore;
use crate::{Error, Result};

/// Assignment store persisted to a JSON file.
///
/// Every `set` rewrites the full map, so recording N first-time assignments
/// writes O(N²) bytes in total. Suited to thousands of subjects, not
/// millions; put a database behind [`AssignmentStore`] beyond that.
///
/// # Example
///
/// ```rust,no_run
/// use abtest_engine::store::{AssignmentStore, FileAssignmentStore};
///
/// # fn example() -> abtest_engine::Result<()> {
/// let store = FileAssignmentStore::open("data/assignments.json")?;
/// store.set("ab_test:exp:user-1", "variant_a")?;
///
/// // A later process sees the same assignment
/// let reopened = FileAssignmentStore::open("data/assignments.json")?;
/// assert_eq!(reopened.get("ab_test:exp:user-1")?, Some("variant_a".to_string()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileAssignmentStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileAssignmentStore {
    /// Open (or lazily create) a store at `path`.
    ///
    /// A missing file is an empty store; the file is created on first write.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "opened assignment store");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the number of stored assignments.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Check if the store is empty.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .read()
            .map_err(|e| Error::StoreError(format!("assignment store lock poisoned: {e}")))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .write()
            .map_err(|e| Error::StoreError(format!("assignment store lock poisoned: {e}")))
    }

    /// Sibling temp file: the full file name with `.tmp` appended.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(OsString::new, OsString::from);
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.temp_path();
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            Error::StoreError(format!(
                "Failed to replace {}: {e}",
                self.path.display()
            ))
        })
    }
}

impl AssignmentStore for FileAssignmentStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, variant_id: &str) -> Result<()> {
        let mut entries = self.write()?;
        let previous = entries.insert(key.to_string(), variant_id.to_string());
        if let Err(e) = self.persist(&entries) {
            // Keep memory and disk in agreement
            match previous {
                Some(value) => entries.insert(key.to_string(), value),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        let mut entries = self.write()?;
        entries.clear();
        self.persist(&entries)
    }
}
