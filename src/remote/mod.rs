//! Folder-based remote storage
//!
//! The coordinator depends only on the narrow capability set in
//! [`RemoteStorage`]. Two backends ship with the crate:
//!
//! - [`LocalFolderStore`]: folders are directories under a root, each with a
//!   JSON index of its snapshots
//! - [`MemoryStore`]: in-process store with fault injection, for tests and
//!   embedders that bring their own transport

mod local;
mod memory;

use std::path::Path;

use async_trait::async_trait;

use crate::error::RemoteResult;
use crate::models::{RemoteFolder, Snapshot};

pub use local::LocalFolderStore;
pub use memory::{Fault, MemoryStore};

/// Capabilities the coordinator needs from a remote store
#[async_trait]
pub trait RemoteStorage: Send + Sync {
    /// Look up a folder by name
    async fn find_folder(&self, name: &str) -> RemoteResult<Option<RemoteFolder>>;

    /// Create a folder, returning the existing one if the name is taken
    async fn create_folder(&self, name: &str) -> RemoteResult<RemoteFolder>;

    /// List objects in `folder` whose title contains `title_contains`
    ///
    /// An empty filter matches everything. Results are newest first.
    async fn query_children(
        &self,
        folder: &RemoteFolder,
        title_contains: &str,
    ) -> RemoteResult<Vec<Snapshot>>;

    /// Upload a local file into `folder` under `title`
    async fn upload(
        &self,
        folder: &RemoteFolder,
        local_path: &Path,
        title: &str,
    ) -> RemoteResult<Snapshot>;

    /// Download a snapshot's payload to `dest`
    async fn download(&self, snapshot: &Snapshot, dest: &Path) -> RemoteResult<()>;

    async fn delete(&self, snapshot: &Snapshot) -> RemoteResult<()>;
}
