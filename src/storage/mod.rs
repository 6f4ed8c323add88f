//! Local storage helpers
//!
//! Atomic JSON persistence shared by the settings file and the
//! filesystem-backed remote store.

pub mod file_io;

pub use file_io::{read_json, read_json_required, remove_if_exists, write_json_atomic};
