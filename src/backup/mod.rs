//! Backup and restore of a local database against remote folder storage
//!
//! # Architecture
//!
//! - `BackupCoordinator`: backs up, finds and restores snapshots for one
//!   database in one remote folder. Each public operation resolves to a
//!   [`BackupOutcome`](crate::models::BackupOutcome) and never returns an
//!   error.
//! - `CoordinatorRegistry`: hands out at most one coordinator per folder
//!   name, so operations against a folder are always serialised by the same
//!   lock.
//!
//! # Snapshot Format
//!
//! A snapshot is a zip archive holding the checkpointed database file under
//! its own name. Its remote title is the file name, suffixed with
//! `_<current_version>` when a schema version is configured.
//!
//! # Retention Policy
//!
//! After a successful upload every other object in the folder is deleted;
//! only the latest snapshot is kept.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dbvault::backup::BackupCoordinator;
//! use dbvault::remote::LocalFolderStore;
//!
//! let remote = Arc::new(LocalFolderStore::new("/mnt/backups"));
//! let coordinator = BackupCoordinator::new(remote, "mixin.db", "backup", || {
//!     Some("/data/app/mixin.db".into())
//! })
//! .with_current_version(19);
//!
//! let outcome = coordinator.backup().await;
//! ```

mod coordinator;
mod registry;
mod restore;

pub use coordinator::{BackupCoordinator, DbAccessor};
pub use registry::CoordinatorRegistry;

use crate::error::{VaultError, VaultResult};

/// Run blocking filesystem or SQLite work off the async executor
async fn run_blocking<T, F>(f: F) -> VaultResult<T>
where
    F: FnOnce() -> VaultResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| VaultError::Io(format!("worker task failed: {}", e)))?
}
