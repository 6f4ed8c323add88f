//! Backup coordinator for dbvault
//!
//! Checkpoints, zips and uploads the live database, then prunes superseded
//! snapshots from the folder.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::run_blocking;
use crate::archive;
use crate::config::BackupSettings;
use crate::database::{Checkpoint, DatabaseFile, SqliteCheckpoint};
use crate::error::{VaultError, VaultResult};
use crate::models::{snapshot_title, BackupOutcome, RemoteFolder, Snapshot, VersionWindow};
use crate::remote::RemoteStorage;
use crate::storage::file_io::remove_if_exists;

/// Resolves the live database path, `None` when it is unavailable
pub type DbAccessor = Arc<dyn Fn() -> Option<PathBuf> + Send + Sync>;

/// Coordinates backup and restore for one database in one remote folder
pub struct BackupCoordinator {
    pub(super) remote: Arc<dyn RemoteStorage>,
    pub(super) checkpoint: Arc<dyn Checkpoint>,
    /// Base name used to query and match snapshots
    pub(super) db_name: String,
    pub(super) folder_name: String,
    db_accessor: DbAccessor,
    /// Restore eligibility; `None` means exact-name match only
    pub(super) window: Option<VersionWindow>,
    /// Appended to upload titles
    current_version: Option<u32>,
    /// Held for the whole of every public operation
    pub(super) op_lock: Mutex<()>,
}

impl BackupCoordinator {
    /// Create a coordinator that checkpoints with [`SqliteCheckpoint`]
    pub fn new<F>(
        remote: Arc<dyn RemoteStorage>,
        db_name: impl Into<String>,
        folder_name: impl Into<String>,
        db_accessor: F,
    ) -> Self
    where
        F: Fn() -> Option<PathBuf> + Send + Sync + 'static,
    {
        Self {
            remote,
            checkpoint: Arc::new(SqliteCheckpoint),
            db_name: db_name.into(),
            folder_name: folder_name.into(),
            db_accessor: Arc::new(db_accessor),
            window: None,
            current_version: None,
            op_lock: Mutex::new(()),
        }
    }

    /// Build a coordinator from persisted settings
    ///
    /// The accessor returns `settings.database_path`.
    pub fn from_settings(remote: Arc<dyn RemoteStorage>, settings: &BackupSettings) -> Self {
        let database_path = settings.database_path.clone();
        let mut coordinator = Self::new(
            remote,
            settings.db_name.clone(),
            settings.folder_name.clone(),
            move || database_path.clone(),
        );
        coordinator.current_version = settings.current_version;
        coordinator.window = settings.version_window();
        coordinator
    }

    pub fn with_checkpoint(mut self, checkpoint: Arc<dyn Checkpoint>) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    pub fn with_current_version(mut self, version: u32) -> Self {
        self.current_version = Some(version);
        self
    }

    /// Restrict restores to `window`; also tags uploads with its current version
    pub fn with_version_window(mut self, window: VersionWindow) -> Self {
        self.current_version = Some(window.current_version);
        self.window = Some(window);
        self
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn version_window(&self) -> Option<VersionWindow> {
        self.window
    }

    pub fn current_version(&self) -> Option<u32> {
        self.current_version
    }

    /// Back up the live database
    ///
    /// `NotFound` when the accessor yields no file; `Failure` when any
    /// remote, checkpoint or packaging step fails.
    pub async fn backup(&self) -> BackupOutcome {
        let _guard = self.op_lock.lock().await;
        match self.run_backup().await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(folder = %self.folder_name, error = %e, "backup failed");
                BackupOutcome::Failure
            }
        }
    }

    /// Run [`backup`](Self::backup) as a background task
    pub fn spawn_backup(self: &Arc<Self>) -> JoinHandle<BackupOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.backup().await })
    }

    pub(super) fn resolve_db(&self) -> Option<DatabaseFile> {
        (self.db_accessor)().map(DatabaseFile::new)
    }

    /// Look up the folder, creating it if absent
    async fn ensure_folder(&self) -> VaultResult<RemoteFolder> {
        if let Some(folder) = self.remote.find_folder(&self.folder_name).await? {
            return Ok(folder);
        }
        info!(folder = %self.folder_name, "creating remote folder");
        Ok(self.remote.create_folder(&self.folder_name).await?)
    }

    async fn run_backup(&self) -> VaultResult<BackupOutcome> {
        // Checked before any remote call
        let db = match self.resolve_db() {
            Some(db) if db.exists() => db,
            Some(db) => {
                info!(path = %db.path().display(), "database file missing, nothing to back up");
                return Ok(BackupOutcome::NotFound);
            }
            None => {
                info!(folder = %self.folder_name, "no database available, nothing to back up");
                return Ok(BackupOutcome::NotFound);
            }
        };

        let folder = self.ensure_folder().await?;
        let title = snapshot_title(&db.file_name()?, self.current_version);
        let zip_path = db.zip_path()?;

        let uploaded = self.upload_snapshot(&db, &folder, &zip_path, &title).await;
        if let Err(e) = remove_if_exists(&zip_path) {
            warn!(path = %zip_path.display(), error = %e, "failed to remove temporary archive");
        }
        let snapshot = uploaded?;

        info!(
            folder = %folder.name,
            title = %snapshot.title,
            size_bytes = snapshot.size_bytes,
            "backup uploaded"
        );
        self.prune_superseded(&folder, &snapshot).await;

        Ok(BackupOutcome::Success)
    }

    async fn upload_snapshot(
        &self,
        db: &DatabaseFile,
        folder: &RemoteFolder,
        zip_path: &Path,
        title: &str,
    ) -> VaultResult<Snapshot> {
        let checkpoint = Arc::clone(&self.checkpoint);
        let source = db.clone();
        let target = zip_path.to_path_buf();

        let archive_size = run_blocking(move || {
            checkpoint.checkpoint(&source)?;
            archive::zip_file(source.path(), &target)
        })
        .await?;
        debug!(title, archive_size, "database packaged");

        self.remote
            .upload(folder, zip_path, title)
            .await
            .map_err(VaultError::from)
    }

    /// Delete every object in the folder except `keep`
    ///
    /// Failures are logged; the backup itself already succeeded.
    async fn prune_superseded(&self, folder: &RemoteFolder, keep: &Snapshot) {
        let existing = match self.remote.query_children(folder, "").await {
            Ok(existing) => existing,
            Err(e) => {
                warn!(folder = %folder.name, error = %e, "could not list folder for pruning");
                return;
            }
        };

        for snapshot in existing
            .iter()
            .filter(|s| s.remote_id != keep.remote_id)
        {
            match self.remote.delete(snapshot).await {
                Ok(()) => debug!(folder = %folder.name, title = %snapshot.title, "pruned snapshot"),
                Err(e) => warn!(
                    folder = %folder.name,
                    title = %snapshot.title,
                    error = %e,
                    "failed to prune snapshot"
                ),
            }
        }
    }
}

impl std::fmt::Debug for BackupCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupCoordinator")
            .field("db_name", &self.db_name)
            .field("folder_name", &self.folder_name)
            .field("window", &self.window)
            .field("current_version", &self.current_version)
            .finish_non_exhaustive()
    }
}
