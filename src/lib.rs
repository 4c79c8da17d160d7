//! release-helper - Release bookkeeping for GitHub repositories.
//!
//! # Overview
//!
//! release-helper runs inside a workflow and does one of two things:
//!
//! - On a release PR (`release/<version>` into `main` or `master`), it adds a
//!   CHANGELOG block built from the PR's issue-linked commits, bumps declared
//!   version strings and commits both to the release branch.
//! - On a tag, it builds GitHub release notes from the release PR description
//!   and the commits of the release, grouped by issue label.
//!
//! The result is printed as one base64 line for the workflow to consume.

pub mod changelog;
pub mod commits;
pub mod config;
pub mod error;
pub mod github;
pub mod release;

// Re-export commonly used types
pub use changelog::{Category, ChangelogEntry};
pub use commits::{RawCommit, StopRule};
pub use config::{ActionArgs, ActionConfig, Operation, ReleaseConfig};
pub use error::{ConfigError, HostError, ReleaseError, VersionFileError};
pub use github::{GitHubHost, SourceHost};
pub use release::{Outcome, ReleaseManager};
