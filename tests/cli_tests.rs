//! CLI integration tests

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use tempfile::TempDir;

fn dbvault(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dbvault").unwrap();
    cmd.env("DBVAULT_DATA_DIR", data_dir)
        .env_remove("DBVAULT_DB")
        .env_remove("DBVAULT_DB_NAME")
        .env_remove("DBVAULT_FOLDER")
        .env_remove("DBVAULT_REMOTE_ROOT")
        .env_remove("RUST_LOG");
    cmd
}

fn create_database(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE assets (symbol TEXT NOT NULL);
         INSERT INTO assets VALUES ('BTC'), ('XIN');",
    )
    .unwrap();
}

#[test]
fn test_help() {
    let temp = TempDir::new().unwrap();
    dbvault(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("restore"));
}

#[test]
fn test_backup_list_find_restore() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("mixin.db");
    create_database(&db);

    dbvault(temp.path())
        .arg("--db")
        .arg(&db)
        .arg("backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup complete."));

    dbvault(temp.path())
        .arg("--db")
        .arg(&db)
        .args(["list", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mixin.db"))
        .stdout(predicate::str::contains("Total: 1 snapshot(s)"));

    dbvault(temp.path())
        .arg("--db")
        .arg(&db)
        .arg("find")
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot: mixin.db"));

    // Without --force nothing is replaced
    fs::write(&db, b"damaged").unwrap();
    dbvault(temp.path())
        .arg("--db")
        .arg(&db)
        .arg("restore")
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
    assert_eq!(fs::read(&db).unwrap(), b"damaged");

    dbvault(temp.path())
        .arg("--db")
        .arg(&db)
        .args(["restore", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restore complete!"));

    let conn = Connection::open(&db).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn test_backup_missing_database_exits_not_found() {
    let temp = TempDir::new().unwrap();

    dbvault(temp.path())
        .arg("--db")
        .arg(temp.path().join("missing.db"))
        .arg("backup")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("No database file to back up."));
}

#[test]
fn test_find_in_empty_store_exits_not_found() {
    let temp = TempDir::new().unwrap();

    dbvault(temp.path())
        .args(["--folder", "nowhere", "find"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("No eligible snapshot"));
}

#[test]
fn test_init_persists_target() {
    let temp = TempDir::new().unwrap();

    dbvault(temp.path())
        .args(["--folder", "chat-db", "--min-version", "15", "--current-version", "19", "init"])
        .assert()
        .success();
    assert!(temp.path().join("config.json").exists());

    dbvault(temp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat-db"))
        .stdout(predicate::str::contains("15..=19"));
}

#[test]
fn test_inverted_window_rejected() {
    let temp = TempDir::new().unwrap();

    dbvault(temp.path())
        .args(["--min-version", "20", "--current-version", "19", "config"])
        .assert()
        .failure();
}
