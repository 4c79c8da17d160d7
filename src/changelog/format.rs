//! Changelog entry types.

/// Release-notes category, derived from issue labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Feature,
    Bug,
    Admin,
    Uncategorized,
}

impl Category {
    /// All categories in release-notes order.
    pub const ALL: [Category; 4] = [
        Category::Feature,
        Category::Bug,
        Category::Admin,
        Category::Uncategorized,
    ];

    /// Bold section heading used in release notes.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Feature => "**New features**",
            Self::Bug => "**Bug fixes**",
            Self::Admin => "**Under the hood**",
            Self::Uncategorized => "**Changes**",
        }
    }
}

/// One accepted commit after parsing and classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub message: String,
    pub issue: String,
    pub author: String,
    /// Author is a member of the project's organization.
    pub internal: bool,
    pub category: Category,
    pub breaking: bool,
}

impl ChangelogEntry {
    /// `"<message> (#<issue>)"` plus a thank-you for outside contributors.
    pub fn line(&self) -> String {
        if self.internal {
            format!("{} (#{})", self.message, self.issue)
        } else {
            format!("{} (#{}) - thanks @{}!", self.message, self.issue, self.author)
        }
    }
}
