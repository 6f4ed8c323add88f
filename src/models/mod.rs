//! Core data models for dbvault
//!
//! Remote descriptors, the version window and the operation outcome.

pub mod ids;
pub mod outcome;
pub mod snapshot;
pub mod version;

pub use ids::{FolderId, SnapshotId};
pub use outcome::BackupOutcome;
pub use snapshot::{RemoteFolder, Snapshot};
pub use version::{is_eligible, snapshot_title, title_version, VersionWindow};
