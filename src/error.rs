//! Error types for release-helper modules using thiserror.

use thiserror::Error;

/// Errors from the source-hosting API.
///
/// A missing resource is never reported here; lookups return `Ok(None)` or an
/// empty collection instead.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("GitHub request failed while trying to {operation}: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: Box<octocrab::Error>,
    },

    #[error("GitHub response for {operation} is missing '{field}'")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("Issue reference '{0}' is not a number")]
    InvalidIssueNumber(String),
}

impl HostError {
    pub(crate) fn request(operation: &'static str, source: octocrab::Error) -> Self {
        Self::Request {
            operation,
            source: Box::new(source),
        }
    }
}

/// Errors from a release operation.
///
/// Everything before the ref update only creates unreferenced objects, so a
/// `Host` error leaves the branch untouched. `RefUpdateRejected` is the single
/// commit point failing.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("Failed to move branch '{branch}' to the release commit: {source}")]
    RefUpdateRejected {
        branch: String,
        #[source]
        source: HostError,
    },
}

/// Errors from startup configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Repository must be given as 'owner/name', got '{0}'")]
    InvalidRepository(String),

    #[error(
        "GitHub authentication failed: no token found. Set ACCESS_TOKEN, GITHUB_TOKEN or GH_TOKEN"
    )]
    MissingToken,

    #[error("Failed to build GitHub client: {0}")]
    Client(#[source] Box<octocrab::Error>),
}

/// Errors from reading version-location declarations.
#[derive(Error, Debug)]
pub enum VersionFileError {
    #[error("Invalid JSON in '{path}': {reason}")]
    InvalidJson { path: String, reason: String },

    #[error("Invalid TOML in '{path}': {reason}")]
    InvalidToml { path: String, reason: String },

    #[error("Entry '{file}' in '{path}' must be a string or a list of strings")]
    InvalidEntry { path: String, file: String },

    #[error("Placeholder '{0}' has no x.x.x token")]
    MissingToken(String),

    #[error("Placeholder '{placeholder}' is not a valid pattern: {reason}")]
    InvalidPattern { placeholder: String, reason: String },
}
