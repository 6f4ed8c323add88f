//! Remote snapshot and folder descriptors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{FolderId, SnapshotId};

/// One uploaded database archive
///
/// Snapshots are immutable once uploaded; a newer backup supersedes and
/// deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Remote title, `<file_name>` or `<file_name>_<version>`
    pub title: String,
    pub remote_id: SnapshotId,
    /// Name of the folder holding this snapshot
    pub folder: String,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
}

impl Snapshot {
    pub fn new(
        title: impl Into<String>,
        folder: impl Into<String>,
        created_at: DateTime<Utc>,
        size_bytes: u64,
    ) -> Self {
        Self {
            title: title.into(),
            remote_id: SnapshotId::new(),
            folder: folder.into(),
            created_at,
            size_bytes,
        }
    }

    /// Version suffix of the title, if it parses
    pub fn version(&self) -> Option<u32> {
        super::version::title_version(&self.title)
    }
}

/// A named namespace in remote storage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteFolder {
    pub name: String,
    pub remote_id: FolderId,
}

impl RemoteFolder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote_id: FolderId::new(),
        }
    }
}
