//! Release window selection: the newest commits up to the previous release.

use std::sync::LazyLock;

use regex_lite::Regex;

use super::parser::RawCommit;

// Matches anywhere in the message, with or without a version.
static RELEASE_COMMIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Prepare for v*[\d.]*(?:-[\w.]+)? *release").expect("release pattern is valid")
});

static MERGE_COMMIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Merge (?:pull request|branch)").expect("merge pattern is valid")
});

/// Where a release window ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRule {
    /// Stop at a previous "Prepare for ... release" commit. Used when preparing
    /// a release from pull request commits.
    PrepareMarker,
    /// Also stop at merge commits. Used when describing a release from the
    /// history of its base branch.
    PrepareOrMerge,
}

/// Message of the commit this tool creates for a release.
pub fn release_commit_message(version: &str) -> String {
    format!("Prepare for {} release", version)
}

/// Whether the commit's first line is exactly the release commit for `version`.
pub fn is_release_commit_for(commit: &RawCommit, version: &str) -> bool {
    commit.subject().trim_end() == release_commit_message(version)
}

fn is_release_commit(message: &str) -> bool {
    RELEASE_COMMIT_PATTERN.is_match(message)
}

fn is_merge_commit(message: &str) -> bool {
    MERGE_COMMIT_PATTERN.is_match(message)
}

/// True if `message` names the branch `release/<version>` exactly.
fn mentions_release_branch(message: &str, version: &str) -> bool {
    let branch = format!("release/{}", version);
    message.match_indices(&branch).any(|(start, _)| {
        message[start + branch.len()..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '.' || c == '-'))
    })
}

fn is_boundary(commit: &RawCommit, version: Option<&str>, rule: StopRule) -> bool {
    if is_release_commit(&commit.message) {
        return !version.is_some_and(|v| is_release_commit_for(commit, v));
    }

    if rule == StopRule::PrepareOrMerge && is_merge_commit(&commit.message) {
        return !version.is_some_and(|v| mentions_release_branch(commit.subject(), v));
    }

    false
}

/// Select the commits belonging to the release being prepared or described.
///
/// Walks newest first and stops, exclusively, at the first boundary commit.
/// The release commit for `version` itself, and under `PrepareOrMerge` the
/// merge of `release/<version>`, belong to the current release and do not stop
/// the walk. Without any boundary the whole input is returned.
pub fn select_window<'a>(
    commits: &'a [RawCommit],
    version: Option<&str>,
    rule: StopRule,
) -> &'a [RawCommit] {
    let end = commits
        .iter()
        .position(|c| is_boundary(c, version, rule))
        .unwrap_or(commits.len());

    &commits[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(message: &str) -> RawCommit {
        RawCommit {
            sha: format!("sha-{}", message.len()),
            message: message.to_string(),
            author_login: Some("dev".into()),
            author_name: "Dev".into(),
            author_email: "dev@example.com".into(),
        }
    }

    fn messages(window: &[RawCommit]) -> Vec<&str> {
        window.iter().map(|c| c.message.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(select_window(&[], None, StopRule::PrepareMarker).is_empty());
    }

    #[test]
    fn test_no_boundary_returns_everything() {
        let commits = vec![commit("Add a (close #2)"), commit("Add b (close #1)")];
        let window = select_window(&commits, Some("1.0.0"), StopRule::PrepareMarker);
        assert_eq!(window, &commits[..]);
    }

    #[test]
    fn test_stops_before_previous_release() {
        let commits = vec![
            commit("Add c (close #3)"),
            commit("Add b (close #2)"),
            commit("Prepare for 0.1.0 release"),
            commit("Add a (close #1)"),
        ];
        let window = select_window(&commits, Some("0.2.0"), StopRule::PrepareMarker);
        assert_eq!(messages(window), vec!["Add c (close #3)", "Add b (close #2)"]);
    }

    #[test]
    fn test_marker_matches_anywhere_and_without_version() {
        let commits = vec![commit("Add c (close #3)"), commit("chore: Prepare for release")];
        assert_eq!(select_window(&commits, None, StopRule::PrepareMarker).len(), 1);

        let commits = vec![commit("Add c (close #3)"), commit("Prepare for v1.2 release")];
        assert_eq!(select_window(&commits, None, StopRule::PrepareMarker).len(), 1);
    }

    #[test]
    fn test_current_release_commit_is_kept() {
        let commits = vec![
            commit("Prepare for 0.12.0 release\n\n* Update CHANGELOG"),
            commit("Add b (close #2)"),
            commit("Prepare for 0.11.0 release"),
        ];
        let window = select_window(&commits, Some("0.12.0"), StopRule::PrepareMarker);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_prepare_mode_includes_merges() {
        let commits = vec![
            commit("Merge branch 'main' into release/1.0.0"),
            commit("Add a (close #1)"),
        ];
        let window = select_window(&commits, Some("1.0.0"), StopRule::PrepareMarker);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_notes_mode_stops_at_older_merge() {
        let commits = vec![
            commit("Merge branch 'release/0.12.0'"),
            commit("Prepare for 0.12.0 release"),
            commit("Add b (close #2)"),
            commit("Merge pull request #40 from org/release/0.11.0"),
            commit("Add a (close #1)"),
        ];
        let window = select_window(&commits, Some("0.12.0"), StopRule::PrepareOrMerge);
        assert_eq!(window.len(), 3);
        assert_eq!(window[2].message, "Add b (close #2)");
    }

    #[test]
    fn test_notes_mode_other_release_merge_is_boundary() {
        let commits = vec![
            commit("Merge pull request #41 from org/release/0.12.0-rc.1"),
            commit("Add b (close #2)"),
        ];
        let window = select_window(&commits, Some("0.12.0"), StopRule::PrepareOrMerge);
        assert!(window.is_empty());
    }

    #[test]
    fn test_merge_must_start_message() {
        let commits = vec![commit("Revert Merge branch handling (close #9)")];
        let window = select_window(&commits, None, StopRule::PrepareOrMerge);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_release_commit_for_requires_exact_version() {
        let c = commit("Prepare for 0.2.0 release");
        assert!(is_release_commit_for(&c, "0.2.0"));
        assert!(!is_release_commit_for(&c, "0.3.0"));
        assert!(!is_release_commit_for(&c, "0.2"));
    }
}
