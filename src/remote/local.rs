//! Filesystem-backed remote store
//!
//! Layout under the root:
//!
//! ```text
//! <root>/<folder>/index.json      folder descriptor + snapshot list
//! <root>/<folder>/<uuid>.blob     one payload per snapshot
//! ```
//!
//! Payloads are copied to a temp file and renamed into place before the
//! index is updated, so an interrupted upload never appears in a listing.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::RemoteStorage;
use crate::error::{RemoteError, RemoteResult};
use crate::models::{RemoteFolder, Snapshot};
use crate::storage::file_io::{read_json_required, remove_if_exists, write_json_atomic};

const INDEX_FILE: &str = "index.json";

#[derive(Debug, Serialize, Deserialize)]
struct FolderIndex {
    folder: RemoteFolder,
    /// Newest first
    #[serde(default)]
    objects: Vec<Snapshot>,
}

/// Remote store rooted at a local directory
#[derive(Clone)]
pub struct LocalFolderStore {
    root: PathBuf,
    // Serialises index read-modify-write within this process
    index_lock: Arc<Mutex<()>>,
}

impl LocalFolderStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn folder_dir(&self, name: &str) -> RemoteResult<PathBuf> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !valid {
            return Err(RemoteError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    fn blob_path(&self, snapshot: &Snapshot) -> RemoteResult<PathBuf> {
        Ok(self
            .folder_dir(&snapshot.folder)?
            .join(format!("{}.blob", snapshot.remote_id.as_uuid())))
    }
}

fn load_index(dir: &Path) -> RemoteResult<Option<FolderIndex>> {
    let path = dir.join(INDEX_FILE);
    if !path.exists() {
        return Ok(None);
    }
    read_json_required(&path)
        .map(Some)
        .map_err(|e| RemoteError::Index(e.to_string()))
}

fn save_index(dir: &Path, index: &FolderIndex) -> RemoteResult<()> {
    write_json_atomic(dir.join(INDEX_FILE), index).map_err(|e| RemoteError::Index(e.to_string()))
}

/// Run blocking filesystem work off the async executor
async fn blocking<T, F>(f: F) -> RemoteResult<T>
where
    F: FnOnce() -> RemoteResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RemoteError::Transfer(format!("worker task failed: {}", e)))?
}

#[async_trait]
impl RemoteStorage for LocalFolderStore {
    async fn find_folder(&self, name: &str) -> RemoteResult<Option<RemoteFolder>> {
        let dir = self.folder_dir(name)?;
        let index = blocking(move || load_index(&dir)).await?;
        Ok(index.map(|i| i.folder))
    }

    async fn create_folder(&self, name: &str) -> RemoteResult<RemoteFolder> {
        let dir = self.folder_dir(name)?;
        let name = name.to_string();
        let _guard = self.index_lock.lock().await;

        blocking(move || {
            if let Some(existing) = load_index(&dir)? {
                return Ok(existing.folder);
            }
            fs::create_dir_all(&dir)?;
            let index = FolderIndex {
                folder: RemoteFolder::new(name),
                objects: Vec::new(),
            };
            save_index(&dir, &index)?;
            debug!(dir = %dir.display(), "created remote folder");
            Ok(index.folder)
        })
        .await
    }

    async fn query_children(
        &self,
        folder: &RemoteFolder,
        title_contains: &str,
    ) -> RemoteResult<Vec<Snapshot>> {
        let dir = self.folder_dir(&folder.name)?;
        let name = folder.name.clone();
        let needle = title_contains.to_string();

        blocking(move || {
            let index = load_index(&dir)?.ok_or(RemoteError::FolderNotFound(name))?;
            Ok(index
                .objects
                .into_iter()
                .filter(|s| s.title.contains(&needle))
                .collect())
        })
        .await
    }

    async fn upload(
        &self,
        folder: &RemoteFolder,
        local_path: &Path,
        title: &str,
    ) -> RemoteResult<Snapshot> {
        let dir = self.folder_dir(&folder.name)?;
        let source = local_path.to_path_buf();
        let name = folder.name.clone();
        let title = title.to_string();
        let _guard = self.index_lock.lock().await;

        blocking(move || {
            let mut index = load_index(&dir)?.ok_or(RemoteError::FolderNotFound(name.clone()))?;

            let size_bytes = fs::metadata(&source)
                .map_err(|e| RemoteError::Transfer(format!("{}: {}", source.display(), e)))?
                .len();
            let snapshot = Snapshot::new(title, name, Utc::now(), size_bytes);

            let blob = dir.join(format!("{}.blob", snapshot.remote_id.as_uuid()));
            let partial = blob.with_extension("part");
            if let Err(e) = fs::copy(&source, &partial).and_then(|_| fs::rename(&partial, &blob)) {
                let _ = remove_if_exists(&partial);
                return Err(RemoteError::Transfer(format!("upload failed: {}", e)));
            }

            index.objects.insert(0, snapshot.clone());
            if let Err(e) = save_index(&dir, &index) {
                let _ = remove_if_exists(&blob);
                return Err(e);
            }
            Ok(snapshot)
        })
        .await
    }

    async fn download(&self, snapshot: &Snapshot, dest: &Path) -> RemoteResult<()> {
        let blob = self.blob_path(snapshot)?;
        let dest = dest.to_path_buf();
        let title = snapshot.title.clone();

        blocking(move || {
            if !blob.exists() {
                return Err(RemoteError::ObjectNotFound(title));
            }
            fs::copy(&blob, &dest)
                .map(|_| ())
                .map_err(|e| RemoteError::Transfer(format!("download failed: {}", e)))
        })
        .await
    }

    async fn delete(&self, snapshot: &Snapshot) -> RemoteResult<()> {
        let dir = self.folder_dir(&snapshot.folder)?;
        let blob = self.blob_path(snapshot)?;
        let target = snapshot.clone();
        let _guard = self.index_lock.lock().await;

        blocking(move || {
            let mut index = load_index(&dir)?
                .ok_or_else(|| RemoteError::FolderNotFound(target.folder.clone()))?;

            let before = index.objects.len();
            index.objects.retain(|s| s.remote_id != target.remote_id);
            if index.objects.len() == before {
                return Err(RemoteError::ObjectNotFound(target.title));
            }
            save_index(&dir, &index)?;
            remove_if_exists(&blob)?;
            Ok(())
        })
        .await
    }
}
