//! Render changelog blocks and release notes.

use super::format::{Category, ChangelogEntry};

/// Separator under a CHANGELOG version heading.
pub const SEPARATOR: &str = "-----------------------";

/// Render a CHANGELOG block for one release.
///
/// ```text
/// Version 0.2.0 (2022-02-01)
/// -----------------------
/// Choose HTTP response codes not to retry (#316)
/// ```
pub fn render_simple(version: &str, date: &str, entries: &[ChangelogEntry]) -> String {
    let mut block = format!("Version {} ({})\n{}\n", version, date, SEPARATOR);

    for entry in entries {
        block.push_str(&entry.line());
        block.push('\n');
    }

    block
}

/// Render categorized release notes.
///
/// Buckets appear in `Category::ALL` order, separated by a blank line. Empty
/// buckets are omitted. Entry order inside a bucket follows the input.
pub fn render_fancy(entries: &[ChangelogEntry]) -> String {
    let sections: Vec<String> = Category::ALL
        .iter()
        .filter_map(|category| {
            let lines: Vec<String> = entries
                .iter()
                .filter(|e| e.category == *category)
                .map(fancy_line)
                .collect();

            if lines.is_empty() {
                return None;
            }

            Some(format!("{}\n{}\n", category.heading(), lines.join("\n")))
        })
        .collect();

    sections.join("\n")
}

fn fancy_line(entry: &ChangelogEntry) -> String {
    if entry.breaking {
        format!("{} **BREAKING CHANGE**", entry.line())
    } else {
        entry.line()
    }
}

/// Put a new block on top of the existing CHANGELOG text.
///
/// Existing content is kept byte for byte below a blank line.
pub fn prepend_block(block: &str, existing: &str) -> String {
    if existing.is_empty() {
        return block.to_string();
    }

    format!("{}\n{}", block, existing)
}

/// Release notes: the pull request description followed by the categorized entries.
pub fn release_notes_text(description: &str, entries: &[ChangelogEntry]) -> String {
    format!("{}\n\n{}", description, render_fancy(entries))
}
