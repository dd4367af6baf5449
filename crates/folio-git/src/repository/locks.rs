//! Per-repository async locks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

/// Hands out one async mutex per on-disk repository path.
///
/// Every operation on a repository holds its mutex, so clones, fetches and
/// reads of one repository never overlap. Different repositories never contend.
#[derive(Debug, Clone, Default)]
pub struct LockRegistry {
    locks: Arc<Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `path`, creating it on first use.
    pub fn lock_for(&self, path: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Number of repositories seen.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_path_same_lock() {
        let registry = LockRegistry::new();
        let a = registry.lock_for(Path::new("/cache/a.git"));
        let again = registry.lock_for(Path::new("/cache/a.git"));
        let b = registry.lock_for(Path::new("/cache/b.git"));

        assert!(Arc::ptr_eq(&a, &again));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_lock_serializes() {
        let registry = LockRegistry::new();
        let lock = registry.lock_for(Path::new("/cache/a.git"));

        let guard = lock.lock().await;
        assert!(registry.lock_for(Path::new("/cache/a.git")).try_lock().is_err());
        assert!(registry.lock_for(Path::new("/cache/b.git")).try_lock().is_ok());
        drop(guard);
        assert!(lock.try_lock().is_ok());
    }
}
