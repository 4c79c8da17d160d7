//! Commit message parsing for issue-linked commits.

use std::sync::LazyLock;

use regex_lite::Regex;

/// A commit as returned by the source host, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    pub sha: String,
    pub message: String,
    /// Account handle of the commit author, when the host could link one.
    pub author_login: Option<String>,
    pub author_name: String,
    pub author_email: String,
}

impl RawCommit {
    /// First line of the commit message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Handle used for attribution, falling back to the git author name.
    pub fn author_handle(&self) -> &str {
        self.author_login.as_deref().unwrap_or(&self.author_name)
    }
}

/// The parts of an accepted commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueCommit {
    pub message: String,
    pub issue: String,
}

// "<text> (close #12)" on the first line. Keywords are case-sensitive.
static COMMIT_MESSAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+) \((?:close|closes|fixes|fix) #(\d+)\)$").expect("commit pattern is valid")
});

/// Parse a commit message into its description and issue number.
///
/// Only the first line is considered. Returns `None` for messages that do not
/// end in a closing keyword with an issue reference.
pub fn parse_commit_message(message: &str) -> Option<IssueCommit> {
    let subject = message.lines().next()?;
    let caps = COMMIT_MESSAGE_PATTERN.captures(subject)?;

    Some(IssueCommit {
        message: caps[1].trim_end().to_string(),
        issue: caps[2].to_string(),
    })
}
