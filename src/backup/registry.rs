//! One coordinator per remote folder
//!
//! Owned by whatever orchestrates backups; not process-wide state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::coordinator::BackupCoordinator;
use crate::error::{VaultError, VaultResult};

/// Hands out a shared coordinator per folder name
#[derive(Default)]
pub struct CoordinatorRegistry {
    coordinators: Mutex<HashMap<String, Arc<BackupCoordinator>>>,
}

impl CoordinatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the coordinator for `folder`, building it with `make` if absent
    ///
    /// `make` must produce a coordinator for the same folder name.
    pub fn get_or_insert_with<F>(&self, folder: &str, make: F) -> VaultResult<Arc<BackupCoordinator>>
    where
        F: FnOnce() -> BackupCoordinator,
    {
        let mut coordinators = self
            .coordinators
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = coordinators.get(folder) {
            return Ok(Arc::clone(existing));
        }

        let coordinator = make();
        if coordinator.folder_name() != folder {
            return Err(VaultError::Validation(format!(
                "coordinator for folder '{}' registered under '{}'",
                coordinator.folder_name(),
                folder
            )));
        }

        debug!(folder, "registered backup coordinator");
        let coordinator = Arc::new(coordinator);
        coordinators.insert(folder.to_string(), Arc::clone(&coordinator));
        Ok(coordinator)
    }

    pub fn get(&self, folder: &str) -> Option<Arc<BackupCoordinator>> {
        self.coordinators
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(folder)
            .cloned()
    }

    /// Drop the registry's handle; in-flight operations keep their own `Arc`
    pub fn remove(&self, folder: &str) -> Option<Arc<BackupCoordinator>> {
        self.coordinators
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(folder)
    }

    pub fn len(&self) -> usize {
        self.coordinators
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryStore;

    fn make(folder: &str) -> BackupCoordinator {
        BackupCoordinator::new(Arc::new(MemoryStore::new()), "mixin.db", folder, || None)
    }

    #[test]
    fn test_same_folder_shares_instance() {
        let registry = CoordinatorRegistry::new();

        let first = registry.get_or_insert_with("backup", || make("backup")).unwrap();
        let second = registry
            .get_or_insert_with("backup", || panic!("must reuse the existing coordinator"))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_folders_are_independent() {
        let registry = CoordinatorRegistry::new();

        let a = registry.get_or_insert_with("backup", || make("backup")).unwrap();
        let b = registry.get_or_insert_with("archive", || make("archive")).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
        assert!(registry.get("archive").is_some());

        registry.remove("archive");
        assert!(registry.get("archive").is_none());
    }

    #[test]
    fn test_mismatched_folder_rejected() {
        let registry = CoordinatorRegistry::new();

        let err = registry
            .get_or_insert_with("backup", || make("elsewhere"))
            .unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
        assert!(registry.is_empty());
    }
}
