//! Search result merging
//!
//! Positional view over asset, contact, chat and message results for a
//! single scrolling list with sticky section headers.

mod package;

pub use package::{is_id_keyword, SearchDataPackage, SearchItem, SearchSection, SECTION_LIMIT};
