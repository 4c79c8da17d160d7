//! GitHub API operations using octocrab.

pub mod auth;
pub mod client;
pub mod host;
pub mod retry;

pub use auth::{TokenSources, select_token};
pub use client::GitHubHost;
pub use host::{
    BranchHead, CommitSource, PullRequest, REGULAR_FILE_MODE, RepoFile, SourceHost, TreeEntry,
};

#[cfg(test)]
pub use host::MockSourceHost;
