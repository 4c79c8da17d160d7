//! Changelog entries and their text renderings.

pub mod format;
pub mod writer;

pub use format::{Category, ChangelogEntry};
pub use writer::{prepend_block, release_notes_text, render_fancy, render_simple};
