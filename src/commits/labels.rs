//! Issue label classification.

use crate::changelog::Category;

pub const ENHANCEMENT_LABEL: &str = "type:enhancement";
pub const DEFECT_LABEL: &str = "type:defect";
pub const ADMIN_LABEL: &str = "type:admin";
pub const BREAKING_CHANGE_LABEL: &str = "category:breaking_change";

/// Category and breaking-change flag derived from an issue's labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub breaking: bool,
}

/// Classify an issue by its labels.
///
/// Category precedence is enhancement, defect, admin. Unknown labels are ignored.
pub fn classify_labels<S: AsRef<str>>(labels: &[S]) -> Classification {
    let has = |wanted: &str| labels.iter().any(|l| l.as_ref() == wanted);

    let category = if has(ENHANCEMENT_LABEL) {
        Category::Feature
    } else if has(DEFECT_LABEL) {
        Category::Bug
    } else if has(ADMIN_LABEL) {
        Category::Admin
    } else {
        Category::Uncategorized
    };

    Classification {
        category,
        breaking: has(BREAKING_CHANGE_LABEL),
    }
}
