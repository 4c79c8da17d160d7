//! The source-hosting operations a release needs.
//!
//! `GitHubHost` is the production implementation. Tests use the generated
//! `MockSourceHost` or an in-memory double.

use async_trait::async_trait;

use crate::commits::RawCommit;
use crate::error::HostError;

/// File mode for regular (non-executable) files in a git tree.
pub const REGULAR_FILE_MODE: &str = "100644";

/// Which history to list commits from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitSource {
    PullRequest(u64),
    Branch(String),
}

/// A file read from the repository at some ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    pub sha: String,
    pub content: String,
}

/// The commit a branch points at, and that commit's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchHead {
    pub commit_sha: String,
    pub tree_sha: String,
}

/// One blob entry of a new tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    pub blob_sha: String,
}

/// Represents a GitHub PR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub base_branch: String,
    pub description: String,
}

/// Operations against the hosted repository.
///
/// Lookups of missing resources return `Ok(None)` (or an empty list). Only
/// transport and API failures are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Commits of a pull request or branch, newest first.
    async fn commits(&self, source: &CommitSource) -> Result<Vec<RawCommit>, HostError>;

    /// Label names of an issue. Empty when the issue does not exist.
    async fn issue_labels(&self, issue: &str) -> Result<Vec<String>, HostError>;

    /// Read a file at a branch name or commit sha.
    async fn file(&self, path: &str, git_ref: &str) -> Result<Option<RepoFile>, HostError>;

    async fn branch_head(&self, branch: &str) -> Result<Option<BranchHead>, HostError>;

    /// Store file content and return the blob sha.
    async fn create_blob(&self, content: &str) -> Result<String, HostError>;

    /// Create a tree on top of `base_tree` and return its sha.
    async fn create_tree(&self, entries: &[TreeEntry], base_tree: &str)
    -> Result<String, HostError>;

    /// Create a commit object and return its sha.
    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parent: &str,
    ) -> Result<String, HostError>;

    /// Point `branch` at `commit`. Rejected when the update is not a fast-forward.
    async fn update_ref(&self, branch: &str, commit: &str) -> Result<(), HostError>;

    /// Find a pull request by title, ignoring case.
    async fn pull_request_by_title(&self, title: &str) -> Result<Option<PullRequest>, HostError>;

    async fn is_organization_member(&self, login: &str) -> Result<bool, HostError>;
}
