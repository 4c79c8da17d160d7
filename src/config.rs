//! Action inputs, read from the workflow environment.
//!
//! Every input can also be given as a flag, which is handy for local runs.
//! Empty values count as unset because runners export inputs that were left
//! blank as empty strings.

use std::fmt;

use clap::Parser;

use crate::error::ConfigError;
use crate::github::{TokenSources, select_token};

/// Default CHANGELOG location.
pub const DEFAULT_CHANGELOG_PATH: &str = "CHANGELOG";

/// Prepare a release PR or generate GitHub release notes.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "release-helper")]
#[command(about = "Prepare release PRs and generate GitHub release notes")]
#[command(version)]
pub struct ActionArgs {
    /// Operation to run: "prepare for release" or "github release notes"
    #[arg(long, env = "INPUT_OPERATION", default_value = "")]
    pub operation: String,

    /// Event that triggered the workflow
    #[arg(long, env = "GITHUB_EVENT_NAME", default_value = "")]
    pub event_name: String,

    /// Target branch of the pull request
    #[arg(long, env = "GITHUB_BASE_REF", default_value = "")]
    pub base_ref: String,

    /// Source branch of the pull request
    #[arg(long, env = "GITHUB_HEAD_REF", default_value = "")]
    pub head_ref: String,

    /// Short ref name: "<number>/merge" for pull requests, the tag for tags
    #[arg(long, env = "GITHUB_REF_NAME", default_value = "")]
    pub ref_name: String,

    /// "branch" or "tag"
    #[arg(long, env = "GITHUB_REF_TYPE", default_value = "")]
    pub ref_type: String,

    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY", default_value = "")]
    pub repository: String,

    /// API token
    #[arg(long = "token", env = "ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[arg(long, env = "GITHUB_TOKEN", hide = true, hide_env_values = true)]
    pub github_token: Option<String>,

    #[arg(long, env = "GH_TOKEN", hide = true, hide_env_values = true)]
    pub gh_token: Option<String>,

    /// File declaring where version strings live (JSON, or TOML by extension)
    #[arg(long, env = "INPUT_VERSION_SCRIPT_PATH")]
    pub version_script_path: Option<String>,

    /// Path of the CHANGELOG file in the repository
    #[arg(long, env = "INPUT_CHANGELOG_PATH")]
    pub changelog_path: Option<String>,

    /// Organization whose members are not thanked (defaults to the repository owner)
    #[arg(long, env = "INPUT_ORGANIZATION")]
    pub organization: Option<String>,

    /// API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// What the action was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    PrepareForRelease,
    GithubReleaseNotes,
    Unknown(String),
}

impl Operation {
    /// Parse the operation input. Case and surrounding spaces are ignored.
    pub fn from_input(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "prepare for release" | "prepare" => Self::PrepareForRelease,
            "github release notes" | "github" => Self::GithubReleaseNotes,
            _ => Self::Unknown(input.to_string()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrepareForRelease => write!(f, "prepare for release"),
            Self::GithubReleaseNotes => write!(f, "github release notes"),
            Self::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// The triggering event, as the runner describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventContext {
    pub event_name: String,
    pub base_ref: String,
    pub head_ref: String,
    pub ref_name: String,
    pub ref_type: String,
}

impl EventContext {
    pub fn is_pull_request(&self) -> bool {
        self.event_name == "pull_request"
    }

    pub fn is_tag(&self) -> bool {
        self.ref_type == "tag"
    }
}

/// Repository owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn parse(repository: &str) -> Result<Self, ConfigError> {
        match repository.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(ConfigError::InvalidRepository(repository.to_string())),
        }
    }
}

/// Settings for a release run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    pub operation: Operation,
    pub event: EventContext,
    pub changelog_path: String,
    pub version_script_path: Option<String>,
}

/// Settings for the GitHub connection.
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub repo: RepoSlug,
    pub organization: String,
    pub token: String,
    pub api_url: Option<String>,
}

/// Everything the binary needs.
#[derive(Debug, Clone)]
pub struct ActionConfig {
    pub release: ReleaseConfig,
    pub github: GitHubSettings,
    pub verbose: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ActionArgs {
    /// Validate inputs and resolve defaults.
    pub fn into_config(self) -> Result<ActionConfig, ConfigError> {
        let repo = RepoSlug::parse(&self.repository)?;

        let token = select_token(&TokenSources {
            access_token: self.access_token,
            github_token: self.github_token,
            gh_token: self.gh_token,
        })?;

        let organization =
            non_empty(self.organization).unwrap_or_else(|| repo.owner.clone());

        let release = ReleaseConfig {
            operation: Operation::from_input(&self.operation),
            event: EventContext {
                event_name: self.event_name,
                base_ref: self.base_ref,
                head_ref: self.head_ref,
                ref_name: self.ref_name,
                ref_type: self.ref_type,
            },
            changelog_path: non_empty(self.changelog_path)
                .unwrap_or_else(|| DEFAULT_CHANGELOG_PATH.to_string()),
            version_script_path: non_empty(self.version_script_path),
        };

        Ok(ActionConfig {
            release,
            github: GitHubSettings {
                repo,
                organization,
                token,
                api_url: non_empty(self.api_url),
            },
            verbose: self.verbose,
        })
    }
}
