//! Local database collaborator
//!
//! A SQLite database in WAL mode is three files: the main file plus
//! `-wal` and `-shm` sidecars. Before export the WAL must be folded into the
//! main file so the main file alone is a complete snapshot; on restore all
//! three are replaced together.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{VaultError, VaultResult};

/// Path set of a live database file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseFile {
    path: PathBuf,
}

impl DatabaseFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component, e.g. `mixin.db`
    pub fn file_name(&self) -> VaultResult<String> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                VaultError::Validation(format!("{} has no file name", self.path.display()))
            })
    }

    /// Directory holding the database and its sidecars
    pub fn parent(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn wal_path(&self) -> PathBuf {
        sidecar(&self.path, "-wal")
    }

    pub fn shm_path(&self) -> PathBuf {
        sidecar(&self.path, "-shm")
    }

    /// Temporary archive path next to the database, `<file_name>.zip`
    pub fn zip_path(&self) -> VaultResult<PathBuf> {
        Ok(self.parent().join(format!("{}.zip", self.file_name()?)))
    }

    /// Staging path used while restoring, `<file_name>.restore`
    pub fn staging_path(&self) -> VaultResult<PathBuf> {
        Ok(self.parent().join(format!("{}.restore", self.file_name()?)))
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// `-wal` then `-shm`
    pub fn sidecar_paths(&self) -> [PathBuf; 2] {
        [self.wal_path(), self.shm_path()]
    }
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Flushes pending writes into the main database file
pub trait Checkpoint: Send + Sync {
    fn checkpoint(&self, db: &DatabaseFile) -> VaultResult<()>;
}

/// Opens the file and runs `PRAGMA wal_checkpoint(TRUNCATE)`
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteCheckpoint;

impl Checkpoint for SqliteCheckpoint {
    fn checkpoint(&self, db: &DatabaseFile) -> VaultResult<()> {
        let conn = Connection::open(db.path())?;
        truncate_wal(&conn)
    }
}

/// Checkpoints through an already-open connection, typically the
/// application's own
pub struct ConnectionCheckpoint {
    conn: Mutex<Connection>,
}

impl ConnectionCheckpoint {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl Checkpoint for ConnectionCheckpoint {
    fn checkpoint(&self, _db: &DatabaseFile) -> VaultResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| VaultError::Database("connection lock poisoned".into()))?;
        truncate_wal(&conn)
    }
}

/// For non-SQLite files that need no flush
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCheckpoint;

impl Checkpoint for NoCheckpoint {
    fn checkpoint(&self, _db: &DatabaseFile) -> VaultResult<()> {
        Ok(())
    }
}

fn truncate_wal(conn: &Connection) -> VaultResult<()> {
    // Columns: busy flag, WAL frames, frames checkpointed
    let (busy, log, checkpointed): (i64, i64, i64) = conn.query_row(
        "PRAGMA wal_checkpoint(TRUNCATE)",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;
    if busy != 0 {
        return Err(VaultError::Database(
            "checkpoint blocked by an active reader or writer".into(),
        ));
    }
    debug!(log, checkpointed, "wal checkpoint complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_sidecar_paths() {
        let db = DatabaseFile::new("/data/app/mixin.db");
        assert_eq!(db.file_name().unwrap(), "mixin.db");
        assert_eq!(db.wal_path(), PathBuf::from("/data/app/mixin.db-wal"));
        assert_eq!(db.shm_path(), PathBuf::from("/data/app/mixin.db-shm"));
        assert_eq!(db.zip_path().unwrap(), PathBuf::from("/data/app/mixin.db.zip"));
        assert_eq!(
            db.staging_path().unwrap(),
            PathBuf::from("/data/app/mixin.db.restore")
        );
    }

    #[test]
    fn test_sidecar_paths_order() {
        let db = DatabaseFile::new("/data/app/mixin.db");
        assert_eq!(
            db.sidecar_paths(),
            [
                PathBuf::from("/data/app/mixin.db-wal"),
                PathBuf::from("/data/app/mixin.db-shm")
            ]
        );
    }

    #[test]
    fn test_sqlite_checkpoint_folds_wal() {
        let temp = TempDir::new().unwrap();
        let db = DatabaseFile::new(temp.path().join("mixin.db"));

        let conn = Connection::open(db.path()).unwrap();
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
        conn.execute_batch(
            "CREATE TABLE messages (id INTEGER PRIMARY KEY, body TEXT);
             INSERT INTO messages (body) VALUES ('hello'), ('world');",
        )
        .unwrap();
        assert!(fs::metadata(db.wal_path()).unwrap().len() > 0);

        let live = ConnectionCheckpoint::new(conn);
        live.checkpoint(&db).unwrap();
        assert_eq!(fs::metadata(db.wal_path()).unwrap().len(), 0);
        drop(live);

        // A fresh connection sees the rows from the main file
        SqliteCheckpoint.checkpoint(&db).unwrap();
        let reopened = Connection::open(db.path()).unwrap();
        let count: i64 = reopened
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_checkpoint_rejects_non_database() {
        let temp = TempDir::new().unwrap();
        let db = DatabaseFile::new(temp.path().join("notes.txt"));
        fs::write(db.path(), b"this is not a sqlite file at all, just text").unwrap();

        assert!(SqliteCheckpoint.checkpoint(&db).is_err());
        assert!(NoCheckpoint.checkpoint(&db).is_ok());
    }
}
