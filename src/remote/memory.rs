//! In-memory remote store
//!
//! Keeps payloads in process memory. Individual operations can be made to
//! fail with [`Fault`], and every trait call is counted so tests can assert
//! that no remote traffic happened.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::RemoteStorage;
use crate::error::{RemoteError, RemoteResult};
use crate::models::{RemoteFolder, Snapshot};

/// Operation that can be forced to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    FindFolder,
    CreateFolder,
    Query,
    Upload,
    Download,
    Delete,
}

impl Fault {
    fn label(self) -> &'static str {
        match self {
            Self::FindFolder => "find_folder",
            Self::CreateFolder => "create_folder",
            Self::Query => "query_children",
            Self::Upload => "upload",
            Self::Download => "download",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug)]
struct StoredObject {
    snapshot: Snapshot,
    payload: Vec<u8>,
}

#[derive(Debug)]
struct FolderEntry {
    folder: RemoteFolder,
    /// Newest first
    objects: Vec<StoredObject>,
}

#[derive(Debug, Default)]
struct State {
    folders: HashMap<String, FolderEntry>,
    faults: HashSet<Fault>,
}

/// Remote store backed by process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call of this kind fail
    pub async fn inject(&self, fault: Fault) {
        self.state.write().await.faults.insert(fault);
    }

    pub async fn clear_faults(&self) {
        self.state.write().await.faults.clear();
    }

    /// Number of trait calls served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Titles in a folder, newest first
    pub async fn titles(&self, folder: &str) -> Vec<String> {
        let state = self.state.read().await;
        state
            .folders
            .get(folder)
            .map(|entry| {
                entry
                    .objects
                    .iter()
                    .map(|o| o.snapshot.title.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Payload of the newest object with `title`
    pub async fn payload(&self, folder: &str, title: &str) -> Option<Vec<u8>> {
        let state = self.state.read().await;
        state.folders.get(folder).and_then(|entry| {
            entry
                .objects
                .iter()
                .find(|o| o.snapshot.title == title)
                .map(|o| o.payload.clone())
        })
    }

    /// Seed an object directly, creating the folder if needed
    ///
    /// Does not count as a remote call.
    pub async fn insert_object(&self, folder: &str, title: &str, payload: Vec<u8>) -> Snapshot {
        let mut state = self.state.write().await;
        let entry = state
            .folders
            .entry(folder.to_string())
            .or_insert_with(|| FolderEntry {
                folder: RemoteFolder::new(folder),
                objects: Vec::new(),
            });

        let snapshot = Snapshot::new(title, folder, Utc::now(), payload.len() as u64);
        entry.objects.insert(
            0,
            StoredObject {
                snapshot: snapshot.clone(),
                payload,
            },
        );
        snapshot
    }

    /// Count the call and fail if the operation is faulted
    async fn enter(&self, fault: Fault) -> RemoteResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.state.read().await.faults.contains(&fault) {
            return Err(RemoteError::Injected(fault.label()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStorage for MemoryStore {
    async fn find_folder(&self, name: &str) -> RemoteResult<Option<RemoteFolder>> {
        self.enter(Fault::FindFolder).await?;
        let state = self.state.read().await;
        Ok(state.folders.get(name).map(|entry| entry.folder.clone()))
    }

    async fn create_folder(&self, name: &str) -> RemoteResult<RemoteFolder> {
        self.enter(Fault::CreateFolder).await?;
        if name.is_empty() {
            return Err(RemoteError::InvalidName(name.to_string()));
        }
        let mut state = self.state.write().await;
        let entry = state
            .folders
            .entry(name.to_string())
            .or_insert_with(|| FolderEntry {
                folder: RemoteFolder::new(name),
                objects: Vec::new(),
            });
        Ok(entry.folder.clone())
    }

    async fn query_children(
        &self,
        folder: &RemoteFolder,
        title_contains: &str,
    ) -> RemoteResult<Vec<Snapshot>> {
        self.enter(Fault::Query).await?;
        let state = self.state.read().await;
        let entry = state
            .folders
            .get(&folder.name)
            .ok_or_else(|| RemoteError::FolderNotFound(folder.name.clone()))?;

        Ok(entry
            .objects
            .iter()
            .filter(|o| o.snapshot.title.contains(title_contains))
            .map(|o| o.snapshot.clone())
            .collect())
    }

    async fn upload(
        &self,
        folder: &RemoteFolder,
        local_path: &Path,
        title: &str,
    ) -> RemoteResult<Snapshot> {
        self.enter(Fault::Upload).await?;
        let payload = tokio::fs::read(local_path).await?;

        let mut state = self.state.write().await;
        let entry = state
            .folders
            .get_mut(&folder.name)
            .ok_or_else(|| RemoteError::FolderNotFound(folder.name.clone()))?;

        let snapshot = Snapshot::new(title, &folder.name, Utc::now(), payload.len() as u64);
        entry.objects.insert(
            0,
            StoredObject {
                snapshot: snapshot.clone(),
                payload,
            },
        );
        Ok(snapshot)
    }

    async fn download(&self, snapshot: &Snapshot, dest: &Path) -> RemoteResult<()> {
        self.enter(Fault::Download).await?;
        let payload = {
            let state = self.state.read().await;
            state
                .folders
                .get(&snapshot.folder)
                .and_then(|entry| {
                    entry
                        .objects
                        .iter()
                        .find(|o| o.snapshot.remote_id == snapshot.remote_id)
                })
                .map(|o| o.payload.clone())
                .ok_or_else(|| RemoteError::ObjectNotFound(snapshot.title.clone()))?
        };

        tokio::fs::write(dest, payload).await?;
        Ok(())
    }

    async fn delete(&self, snapshot: &Snapshot) -> RemoteResult<()> {
        self.enter(Fault::Delete).await?;
        let mut state = self.state.write().await;
        let entry = state
            .folders
            .get_mut(&snapshot.folder)
            .ok_or_else(|| RemoteError::FolderNotFound(snapshot.folder.clone()))?;

        let before = entry.objects.len();
        entry
            .objects
            .retain(|o| o.snapshot.remote_id != snapshot.remote_id);
        if entry.objects.len() == before {
            return Err(RemoteError::ObjectNotFound(snapshot.title.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_folder_lifecycle() {
        let store = MemoryStore::new();
        assert!(store.find_folder("backup").await.unwrap().is_none());

        let created = store.create_folder("backup").await.unwrap();
        let again = store.create_folder("backup").await.unwrap();
        assert_eq!(created, again);
        assert_eq!(store.find_folder("backup").await.unwrap(), Some(created));
        assert_eq!(store.call_count(), 4);
    }

    #[tokio::test]
    async fn test_upload_query_download_delete() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("payload.zip");
        std::fs::write(&src, b"zip bytes").unwrap();

        let store = MemoryStore::new();
        let folder = store.create_folder("backup").await.unwrap();
        store.upload(&folder, &src, "mixin.db_1").await.unwrap();
        let latest = store.upload(&folder, &src, "mixin.db_2").await.unwrap();
        store.insert_object("backup", "other", vec![]).await;

        let found = store.query_children(&folder, "mixin.db").await.unwrap();
        let titles: Vec<_> = found.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["mixin.db_2", "mixin.db_1"]);

        let dest = temp.path().join("out.zip");
        store.download(&latest, &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"zip bytes");

        store.delete(&latest).await.unwrap();
        assert!(store.delete(&latest).await.is_err());
        assert_eq!(store.titles("backup").await, vec!["other", "mixin.db_1"]);
    }

    #[tokio::test]
    async fn test_injected_fault() {
        let store = MemoryStore::new();
        store.inject(Fault::CreateFolder).await;

        let err = store.create_folder("backup").await.unwrap_err();
        assert!(matches!(err, RemoteError::Injected("create_folder")));

        store.clear_faults().await;
        assert!(store.create_folder("backup").await.is_ok());
    }
}
