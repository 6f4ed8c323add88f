//! Result reported by every coordinator operation

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a backup, find or restore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupOutcome {
    Success,
    /// A remote, filesystem or database step failed
    Failure,
    /// Expected absence: no folder, no matching snapshot, or no local file
    NotFound,
}

impl BackupOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for BackupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::NotFound => "NOT_FOUND",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde() {
        for outcome in [
            BackupOutcome::Success,
            BackupOutcome::Failure,
            BackupOutcome::NotFound,
        ] {
            let json = serde_json::to_string(&outcome).unwrap();
            assert_eq!(json, format!("\"{}\"", outcome));
        }
    }

    #[test]
    fn test_is_success() {
        assert!(BackupOutcome::Success.is_success());
        assert!(!BackupOutcome::NotFound.is_success());
    }
}
