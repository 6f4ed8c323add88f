//! Version-tagged snapshot titles
//!
//! A title is `<file_name>` or `<file_name>_<version>`. Parsing splits on
//! `_` and reads the second token, so a base name that itself contains `_`
//! yields no version.

use serde::{Deserialize, Serialize};

/// Inclusive `[min_version, current_version]` range of restorable versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionWindow {
    pub min_version: u32,
    pub current_version: u32,
}

impl VersionWindow {
    pub fn new(min_version: u32, current_version: u32) -> Self {
        Self {
            min_version,
            current_version,
        }
    }

    pub fn contains(&self, version: u32) -> bool {
        self.min_version <= version && version <= self.current_version
    }
}

/// Build the upload title for a database file
pub fn snapshot_title(file_name: &str, current_version: Option<u32>) -> String {
    match current_version {
        Some(version) => format!("{}_{}", file_name, version),
        None => file_name.to_string(),
    }
}

/// Parse the version suffix of a title (second `_`-separated token)
pub fn title_version(title: &str) -> Option<u32> {
    title.split('_').nth(1)?.parse().ok()
}

/// Restore eligibility for a remote title
///
/// With a window, the parsed version must fall inside it; titles without a
/// parseable version are rejected. Without a window only the exact base
/// name qualifies.
pub fn is_eligible(title: &str, db_name: &str, window: Option<&VersionWindow>) -> bool {
    match window {
        Some(window) => title_version(title).is_some_and(|v| window.contains(v)),
        None => title == db_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_title() {
        assert_eq!(snapshot_title("mixin.db", None), "mixin.db");
        assert_eq!(snapshot_title("mixin.db", Some(19)), "mixin.db_19");
    }

    #[test]
    fn test_title_version() {
        assert_eq!(title_version("mixin.db_19"), Some(19));
        assert_eq!(title_version("mixin.db"), None);
        assert_eq!(title_version("mixin.db_beta"), None);
        // Only the second token counts
        assert_eq!(title_version("mixin.db_3_7"), Some(3));
        assert_eq!(title_version("my_app.db_4"), None);
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let window = VersionWindow::new(15, 19);
        assert!(window.contains(15));
        assert!(window.contains(19));
        assert!(!window.contains(14));
        assert!(!window.contains(20));
    }

    #[test]
    fn test_eligibility_with_window() {
        let window = VersionWindow::new(15, 19);
        let titles = ["mixin.db", "mixin.db_14", "mixin.db_15", "mixin.db_17", "mixin.db_19", "mixin.db_20"];

        let accepted: Vec<_> = titles
            .iter()
            .filter(|t| is_eligible(t, "mixin.db", Some(&window)))
            .copied()
            .collect();

        assert_eq!(accepted, vec!["mixin.db_15", "mixin.db_17", "mixin.db_19"]);
    }

    #[test]
    fn test_eligibility_without_window() {
        assert!(is_eligible("mixin.db", "mixin.db", None));
        assert!(!is_eligible("mixin.db_19", "mixin.db", None));
        assert!(!is_eligible("mixin.db.zip", "mixin.db", None));
    }
}
