//! dbvault - SQLite snapshot backup and restore
//!
//! This library backs up a live SQLite database to a remote folder store and
//! restores it again. A snapshot is the checkpointed database file packed
//! into a single-entry zip; the folder only ever keeps the latest one.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Snapshot metadata, version windows and outcomes
//! - `storage`: Atomic JSON file helpers
//! - `remote`: The remote folder store trait and its implementations
//! - `database`: Live database paths and WAL checkpointing
//! - `archive`: Zip packaging of a single file
//! - `backup`: The backup coordinator and per-folder registry
//! - `search`: Merged, paged search results for a single list view
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dbvault::backup::BackupCoordinator;
//! use dbvault::remote::LocalFolderStore;
//!
//! let remote = Arc::new(LocalFolderStore::new("/mnt/share"));
//! let coordinator = BackupCoordinator::new(remote, "mixin.db", "backup", || {
//!     Some("/data/mixin.db".into())
//! });
//! let outcome = coordinator.backup().await;
//! ```

pub mod archive;
pub mod backup;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod remote;
pub mod search;
pub mod storage;

pub use error::{VaultError, VaultResult};
