//! User settings for dbvault
//!
//! Holds the backup target (database name, remote folder, version window)
//! and the default log filter.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::VaultPaths;
use crate::error::VaultError;
use crate::models::VersionWindow;
use crate::storage::file_io::{read_json, write_json_atomic};

/// What to back up and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSettings {
    /// Base name used to query snapshots (e.g. `mixin.db`)
    #[serde(default = "default_db_name")]
    pub db_name: String,

    /// Remote folder that scopes all snapshots of this database
    #[serde(default = "default_folder_name")]
    pub folder_name: String,

    /// Lowest snapshot version still accepted on restore
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<u32>,

    /// Schema version of the running database, appended to backup titles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<u32>,

    /// Path of the live database file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

fn default_db_name() -> String {
    "mixin.db".to_string()
}

fn default_folder_name() -> String {
    "backup".to_string()
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            db_name: default_db_name(),
            folder_name: default_folder_name(),
            min_version: None,
            current_version: None,
            database_path: None,
        }
    }
}

impl BackupSettings {
    /// The restore window, present only when both bounds are configured
    pub fn version_window(&self) -> Option<VersionWindow> {
        match (self.min_version, self.current_version) {
            (Some(min), Some(current)) => Some(VersionWindow::new(min, current)),
            _ => None,
        }
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.db_name.trim().is_empty() {
            return Err(VaultError::Validation("db_name must not be empty".into()));
        }
        if self.folder_name.trim().is_empty() {
            return Err(VaultError::Validation(
                "folder_name must not be empty".into(),
            ));
        }
        if let Some(window) = self.version_window() {
            if window.min_version > window.current_version {
                return Err(VaultError::Validation(format!(
                    "min_version {} is above current_version {}",
                    window.min_version, window.current_version
                )));
            }
        }
        Ok(())
    }
}

/// User settings for dbvault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub backup: BackupSettings,

    /// Root of the local folder store; defaults to `<data dir>/remote`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_root: Option<PathBuf>,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_log_filter() -> String {
    "dbvault=info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backup: BackupSettings::default(),
            remote_root: None,
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Remote store root, falling back to the data directory
    pub fn remote_root(&self, paths: &VaultPaths) -> PathBuf {
        self.remote_root
            .clone()
            .unwrap_or_else(|| paths.remote_root())
    }

    /// Load settings from disk, or defaults if the file doesn't exist
    ///
    /// Defaults are not written back; `save` persists them.
    pub fn load_or_create(paths: &VaultPaths) -> Result<Self, VaultError> {
        read_json(paths.settings_file())
            .map_err(|e| VaultError::Config(format!("Failed to load settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &VaultPaths) -> Result<(), VaultError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}
