//! Backup CLI commands
//!
//! Wires the coordinator to the filesystem-backed remote store and prints
//! each outcome.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Subcommand};

use crate::backup::BackupCoordinator;
use crate::config::paths::VaultPaths;
use crate::config::settings::{BackupSettings, Settings};
use crate::database::{Checkpoint, DatabaseFile, NoCheckpoint, SqliteCheckpoint};
use crate::error::VaultResult;
use crate::models::{BackupOutcome, Snapshot};
use crate::remote::LocalFolderStore;

/// Overrides for the persisted backup target
#[derive(Args, Debug, Default, Clone)]
pub struct TargetArgs {
    /// Path of the live database file
    #[arg(long, global = true, env = "DBVAULT_DB")]
    pub db: Option<PathBuf>,

    /// Base name matched against snapshot titles (defaults to the file name of --db)
    #[arg(long, global = true, env = "DBVAULT_DB_NAME")]
    pub db_name: Option<String>,

    /// Remote folder holding the snapshots
    #[arg(long, global = true, env = "DBVAULT_FOLDER")]
    pub folder: Option<String>,

    /// Directory of the folder-based remote store
    #[arg(long, global = true, env = "DBVAULT_REMOTE_ROOT")]
    pub remote_root: Option<PathBuf>,

    /// Lowest snapshot version accepted on restore
    #[arg(long, global = true)]
    pub min_version: Option<u32>,

    /// Schema version of the running database
    #[arg(long, global = true)]
    pub current_version: Option<u32>,

    /// Skip the SQLite WAL checkpoint (for non-SQLite files)
    #[arg(long, global = true)]
    pub no_checkpoint: bool,
}

impl TargetArgs {
    /// Layer the flags over persisted settings
    pub fn apply(&self, settings: &mut Settings) {
        apply_backup(self, &mut settings.backup);
        if let Some(root) = &self.remote_root {
            settings.remote_root = Some(root.clone());
        }
    }

    fn checkpoint(&self) -> Arc<dyn Checkpoint> {
        if self.no_checkpoint {
            Arc::new(NoCheckpoint)
        } else {
            Arc::new(SqliteCheckpoint)
        }
    }
}

fn apply_backup(args: &TargetArgs, backup: &mut BackupSettings) {
    if let Some(db) = &args.db {
        backup.database_path = Some(db.clone());
        if args.db_name.is_none() {
            if let Some(name) = db.file_name() {
                backup.db_name = name.to_string_lossy().into_owned();
            }
        }
    }
    if let Some(name) = &args.db_name {
        backup.db_name = name.clone();
    }
    if let Some(folder) = &args.folder {
        backup.folder_name = folder.clone();
    }
    if args.min_version.is_some() {
        backup.min_version = args.min_version;
    }
    if args.current_version.is_some() {
        backup.current_version = args.current_version;
    }
}

/// Backup subcommands
#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Checkpoint, zip and upload the database
    Backup,

    /// Show the snapshot a restore would use
    Find,

    /// Replace the database with the selected snapshot
    Restore {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List every snapshot of the database in the folder
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Save the current target as defaults
    Init,

    /// Show current configuration and paths
    Config,
}

/// Handle a backup command
pub async fn handle_backup_command(
    paths: &VaultPaths,
    settings: &Settings,
    target: &TargetArgs,
    cmd: BackupCommands,
) -> VaultResult<BackupOutcome> {
    let remote = Arc::new(LocalFolderStore::new(settings.remote_root(paths)));
    let coordinator = BackupCoordinator::from_settings(remote, &settings.backup)
        .with_checkpoint(target.checkpoint());

    match cmd {
        BackupCommands::Backup => {
            println!(
                "Backing up {} to folder '{}'...",
                display_db(&settings.backup),
                coordinator.folder_name()
            );
            let outcome = coordinator.backup().await;
            match outcome {
                BackupOutcome::Success => println!("Backup complete."),
                BackupOutcome::NotFound => println!("No database file to back up."),
                BackupOutcome::Failure => println!("Backup failed. Run with RUST_LOG=dbvault=debug for details."),
            }
            Ok(outcome)
        }

        BackupCommands::Find => {
            let (outcome, snapshot) = coordinator.find_backup().await;
            match (&outcome, snapshot) {
                (BackupOutcome::Success, Some(snapshot)) => print_snapshot(&snapshot),
                (BackupOutcome::Failure, _) => println!("Lookup failed."),
                _ => println!(
                    "No eligible snapshot of '{}' in folder '{}'.",
                    coordinator.db_name(),
                    coordinator.folder_name()
                ),
            }
            Ok(outcome)
        }

        BackupCommands::Restore { force } => {
            if !force {
                let (outcome, snapshot) = coordinator.find_backup().await;
                let Some(snapshot) = snapshot else {
                    println!("No eligible snapshot to restore.");
                    return Ok(outcome);
                };
                print_snapshot(&snapshot);
                println!();
                println!(
                    "WARNING: This will replace {} and its -wal/-shm files!",
                    display_db(&settings.backup)
                );
                println!("To proceed, run again with --force flag:");
                println!("  dbvault restore --force");
                return Ok(BackupOutcome::Success);
            }

            println!("Restoring {}...", display_db(&settings.backup));
            let outcome = coordinator.restore_database().await;
            match outcome {
                BackupOutcome::Success => println!("Restore complete!"),
                BackupOutcome::NotFound => println!("No eligible snapshot to restore."),
                BackupOutcome::Failure => println!("{}", restore_failure_message(&settings.backup)),
            }
            Ok(outcome)
        }

        BackupCommands::List { verbose } => {
            let snapshots = coordinator.list_snapshots().await?;

            if snapshots.is_empty() {
                println!("No snapshots found.");
                println!("Create one with: dbvault backup");
                return Ok(BackupOutcome::Success);
            }

            println!("Snapshots in '{}'", coordinator.folder_name());
            println!("=============");
            println!();

            for (i, snapshot) in snapshots.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(snapshot.created_at);
                if verbose {
                    println!(
                        "{}. {}\n   Id: {}\n   Created: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        snapshot.title,
                        snapshot.remote_id,
                        snapshot.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(snapshot.size_bytes),
                        format_duration(age),
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {})",
                        i + 1,
                        snapshot.title,
                        format_duration(age),
                        format_size(snapshot.size_bytes),
                    );
                }
            }

            println!();
            println!("Total: {} snapshot(s)", snapshots.len());
            Ok(BackupOutcome::Success)
        }

        BackupCommands::Init => {
            settings.save(paths)?;
            println!("Settings saved to {}", paths.settings_file().display());
            Ok(BackupOutcome::Success)
        }

        BackupCommands::Config => {
            let backup = &settings.backup;
            println!("dbvault Configuration");
            println!("=====================");
            println!("Settings file: {}", paths.settings_file().display());
            if !paths.is_initialized() {
                println!("               (not saved, run 'dbvault init')");
            }
            println!("Remote root:   {}", settings.remote_root(paths).display());
            println!();
            println!("Database:      {}", display_db(backup));
            println!("Name:          {}", backup.db_name);
            println!("Folder:        {}", backup.folder_name);
            match backup.version_window() {
                Some(window) => println!(
                    "Restore window: {}..={}",
                    window.min_version, window.current_version
                ),
                None => println!("Restore window: exact name only"),
            }
            if let Some(version) = backup.current_version {
                println!("Current version: {}", version);
            }
            Ok(BackupOutcome::Success)
        }
    }
}

/// Process exit code for an outcome
pub fn exit_code(outcome: BackupOutcome) -> u8 {
    match outcome {
        BackupOutcome::Success => 0,
        BackupOutcome::Failure => 1,
        BackupOutcome::NotFound => 2,
    }
}

fn display_db(backup: &BackupSettings) -> String {
    backup
        .database_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(no database configured)".to_string())
}

/// Points at the staged copy when a swap stopped part-way
fn restore_failure_message(backup: &BackupSettings) -> String {
    let staged = backup
        .database_path
        .as_ref()
        .and_then(|p| DatabaseFile::new(p).staging_path().ok())
        .filter(|p| p.is_file());

    match staged {
        Some(staging) => format!(
            "Restore interrupted. Stale -wal/-shm files may be gone; the restored copy is kept at {}.\n\
             Move it over {} to finish the restore.",
            staging.display(),
            display_db(backup)
        ),
        None => "Restore failed. The live database was not replaced.".to_string(),
    }
}

fn print_snapshot(snapshot: &Snapshot) {
    println!("Snapshot: {}", snapshot.title);
    println!("Folder:   {}", snapshot.folder);
    println!(
        "Created:  {}",
        snapshot.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Size:     {}", format_size(snapshot.size_bytes));
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
