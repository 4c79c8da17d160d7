//! Turning commit history into classified changelog entries.

pub mod labels;
pub mod parser;
pub mod window;

use std::collections::HashMap;

use tracing::debug;

use crate::changelog::ChangelogEntry;
use crate::error::HostError;
use crate::github::SourceHost;

pub use labels::{Classification, classify_labels};
pub use parser::{IssueCommit, RawCommit, parse_commit_message};
pub use window::{StopRule, is_release_commit_for, release_commit_message, select_window};

/// Parse and classify commits, keeping their order.
///
/// Commits without an issue reference are dropped. Each accepted commit costs
/// one label lookup; membership is looked up once per author.
pub async fn collect_entries<H>(
    host: &H,
    commits: &[RawCommit],
) -> Result<Vec<ChangelogEntry>, HostError>
where
    H: SourceHost + ?Sized,
{
    let mut members: HashMap<String, bool> = HashMap::new();
    let mut entries = Vec::new();

    for commit in commits {
        let Some(parsed) = parse_commit_message(&commit.message) else {
            debug!("Skipping commit {} without issue reference", commit.sha);
            continue;
        };

        let labels = host.issue_labels(&parsed.issue).await?;
        let classification = classify_labels(&labels);

        let internal = match &commit.author_login {
            Some(login) => match members.get(login) {
                Some(known) => *known,
                None => {
                    let member = host.is_organization_member(login).await?;
                    members.insert(login.clone(), member);
                    member
                }
            },
            None => false,
        };

        debug!(
            "#{} -> {:?} (breaking: {}, internal: {})",
            parsed.issue, classification.category, classification.breaking, internal
        );

        entries.push(ChangelogEntry {
            message: parsed.message,
            issue: parsed.issue,
            author: commit.author_handle().to_string(),
            internal,
            category: classification.category,
            breaking: classification.breaking,
        });
    }

    Ok(entries)
}
