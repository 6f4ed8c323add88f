//! Snapshot lookup and restoration
//!
//! The live database files are only touched after the download has
//! completed and the archive has been verified. The extracted file is staged
//! next to the database; the `-wal`/`-shm` sidecars are removed and the
//! staged file is renamed over the main file. If the swap stops after a
//! sidecar was removed, the staged file is left in place for recovery.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::coordinator::BackupCoordinator;
use super::run_blocking;
use crate::archive;
use crate::database::DatabaseFile;
use crate::error::{VaultError, VaultResult};
use crate::models::{is_eligible, BackupOutcome, Snapshot};
use crate::storage::file_io::remove_if_exists;

impl BackupCoordinator {
    /// Find the snapshot a restore would use
    ///
    /// Returns `(Success, Some(snapshot))`, `(NotFound, None)` when the
    /// folder or a matching snapshot is absent, or `(Failure, None)` when the
    /// remote store errors.
    pub async fn find_backup(&self) -> (BackupOutcome, Option<Snapshot>) {
        let _guard = self.op_lock.lock().await;
        match self.locate().await {
            Ok(Some(snapshot)) => (BackupOutcome::Success, Some(snapshot)),
            Ok(None) => (BackupOutcome::NotFound, None),
            Err(e) => {
                error!(folder = %self.folder_name, error = %e, "snapshot lookup failed");
                (BackupOutcome::Failure, None)
            }
        }
    }

    /// Replace the live database with the selected snapshot
    pub async fn restore_database(&self) -> BackupOutcome {
        let _guard = self.op_lock.lock().await;
        match self.run_restore().await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(folder = %self.folder_name, error = %e, "restore failed");
                BackupOutcome::Failure
            }
        }
    }

    /// Run [`find_backup`](Self::find_backup) as a background task
    pub fn spawn_find_backup(self: &Arc<Self>) -> JoinHandle<(BackupOutcome, Option<Snapshot>)> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.find_backup().await })
    }

    /// Run [`restore_database`](Self::restore_database) as a background task
    pub fn spawn_restore(self: &Arc<Self>) -> JoinHandle<BackupOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.restore_database().await })
    }

    /// Every snapshot of this database in the folder, newest first, unfiltered
    ///
    /// An absent folder yields an empty list.
    pub async fn list_snapshots(&self) -> VaultResult<Vec<Snapshot>> {
        let _guard = self.op_lock.lock().await;
        let Some(folder) = self.remote.find_folder(&self.folder_name).await? else {
            return Ok(Vec::new());
        };
        Ok(self.remote.query_children(&folder, &self.db_name).await?)
    }

    /// First eligible snapshot in listing order
    async fn locate(&self) -> VaultResult<Option<Snapshot>> {
        let Some(folder) = self.remote.find_folder(&self.folder_name).await? else {
            info!(folder = %self.folder_name, "remote folder not found");
            return Ok(None);
        };

        let candidates = self.remote.query_children(&folder, &self.db_name).await?;
        let selected = candidates
            .into_iter()
            .find(|s| is_eligible(&s.title, &self.db_name, self.window.as_ref()));

        match &selected {
            Some(snapshot) => debug!(folder = %folder.name, title = %snapshot.title, "selected snapshot"),
            None => info!(folder = %folder.name, db_name = %self.db_name, "no eligible snapshot"),
        }
        Ok(selected)
    }

    async fn run_restore(&self) -> VaultResult<BackupOutcome> {
        let Some(snapshot) = self.locate().await? else {
            return Ok(BackupOutcome::NotFound);
        };
        let Some(db) = self.resolve_db() else {
            info!(folder = %self.folder_name, "no database location available for restore");
            return Ok(BackupOutcome::NotFound);
        };

        let zip_path = db.zip_path()?;
        if let Err(e) = self.remote.download(&snapshot, &zip_path).await {
            warn!(title = %snapshot.title, error = %e, "download failed, live database untouched");
            discard(&zip_path);
            return Ok(BackupOutcome::Failure);
        }
        if !zip_path.is_file() {
            warn!(title = %snapshot.title, "downloaded archive missing, live database untouched");
            return Ok(BackupOutcome::Failure);
        }

        let staging = db.staging_path()?;
        let replaced = {
            let db = db.clone();
            let zip_path = zip_path.clone();
            let staging = staging.clone();
            run_blocking(move || Ok(replace_database(&db, &zip_path, &staging))).await
        };
        discard(&zip_path);

        match replaced {
            Ok(Ok(())) => {}
            Ok(Err(SwapError::Untouched(e))) => {
                discard(&staging);
                return Err(e);
            }
            Ok(Err(SwapError::Interrupted(e))) | Err(e) => {
                error!(
                    path = %db.path().display(),
                    staging = %staging.display(),
                    error = %e,
                    "restore interrupted, restored copy kept at staging path"
                );
                return Ok(BackupOutcome::Failure);
            }
        }

        info!(
            folder = %self.folder_name,
            title = %snapshot.title,
            path = %db.path().display(),
            "database restored"
        );
        Ok(BackupOutcome::Success)
    }
}

/// How far a failed swap got
enum SwapError {
    /// No live file was touched
    Untouched(VaultError),
    /// Sidecars are already gone; the staged file is the only complete copy
    Interrupted(VaultError),
}

/// Verify, stage, then swap the archive's database into place
///
/// The sidecars are removed first and the staged file is renamed over the
/// main file, so the main file is never absent.
fn replace_database(db: &DatabaseFile, zip_path: &Path, staging: &Path) -> Result<(), SwapError> {
    let entry = db.file_name().map_err(SwapError::Untouched)?;
    archive::verify_archive(zip_path, &entry).map_err(SwapError::Untouched)?;

    let written = archive::extract_entry(zip_path, &entry, staging).map_err(SwapError::Untouched)?;
    debug!(entry = %entry, written, "archive extracted to staging file");

    let mut removed_any = false;
    let failed = |removed_any: bool, e: VaultError| {
        if removed_any {
            SwapError::Interrupted(e)
        } else {
            SwapError::Untouched(e)
        }
    };

    // Stale sidecars must not be replayed against the restored main file
    for sidecar in db.sidecar_paths() {
        match remove_if_exists(&sidecar) {
            Ok(removed) => {
                if removed {
                    debug!(path = %sidecar.display(), "removed database sidecar");
                }
                removed_any |= removed;
            }
            Err(e) => {
                let e = VaultError::Io(format!("Failed to remove {}: {}", sidecar.display(), e));
                return Err(failed(removed_any, e));
            }
        }
    }

    fs::rename(staging, db.path()).map_err(|e| {
        let e = VaultError::Io(format!(
            "Failed to move {} into place: {}",
            staging.display(),
            e
        ));
        failed(removed_any, e)
    })
}

fn discard(path: &Path) {
    if let Err(e) = remove_if_exists(path) {
        warn!(path = %path.display(), error = %e, "failed to remove temporary file");
    }
}
