//! Configuration module for dbvault
//!
//! - Data directory resolution
//! - Settings persistence (backup target, version window, log filter)

pub mod paths;
pub mod settings;

pub use paths::VaultPaths;
pub use settings::{BackupSettings, Settings};
