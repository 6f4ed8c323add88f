//! Custom error types for dbvault
//!
//! Internal failures are modelled with thiserror. None of them cross the
//! coordinator's public operations, which report a `BackupOutcome` instead.

use thiserror::Error;

/// The main error type for dbvault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Zip packaging or extraction errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Local database errors (checkpoint, open)
    #[error("Database error: {0}")]
    Database(String),

    /// Errors reported by the remote store
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Validation errors for settings and titles
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl VaultError {
    /// Create a "not found" error for a missing archive entry
    pub fn entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Archive entry",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<zip::result::ZipError> for VaultError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

impl From<rusqlite::Error> for VaultError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Result type alias for dbvault operations
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors raised by a `RemoteStorage` backend
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("remote folder not found: {0}")]
    FolderNotFound(String),

    #[error("remote object not found: {0}")]
    ObjectNotFound(String),

    #[error("invalid remote name: {0}")]
    InvalidName(String),

    /// Upload or download did not complete
    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("remote I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The folder index could not be read or written
    #[error("remote index corrupt: {0}")]
    Index(String),

    /// Failure injected by a test store
    #[error("injected failure: {0}")]
    Injected(&'static str),
}

/// Result type alias for remote store operations
pub type RemoteResult<T> = Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = VaultError::entry_not_found("mixin.db");
        assert_eq!(err.to_string(), "Archive entry not found: mixin.db");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let vault_err: VaultError = io_err.into();
        assert!(matches!(vault_err, VaultError::Io(_)));
    }

    #[test]
    fn test_from_remote_error() {
        let err: VaultError = RemoteError::Transfer("upload aborted".into()).into();
        assert_eq!(err.to_string(), "Remote error: transfer failed: upload aborted");
        assert!(!err.is_not_found());
    }
}
