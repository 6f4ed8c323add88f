//! CLI command handlers
//!
//! Bridges clap argument parsing with the backup coordinator.

pub mod backup;

pub use backup::{exit_code, handle_backup_command, BackupCommands, TargetArgs};
