//! GitHub token selection.
//!
//! Order:
//! 1. `ACCESS_TOKEN` (the action's input)
//! 2. `GITHUB_TOKEN`
//! 3. `GH_TOKEN`

use crate::error::ConfigError;

/// Token candidates as collected from the environment at startup.
#[derive(Debug, Default, Clone)]
pub struct TokenSources {
    pub access_token: Option<String>,
    pub github_token: Option<String>,
    pub gh_token: Option<String>,
}

/// Pick the first non-empty token.
pub fn select_token(sources: &TokenSources) -> Result<String, ConfigError> {
    [
        &sources.access_token,
        &sources.github_token,
        &sources.gh_token,
    ]
    .into_iter()
    .flatten()
    .map(|t| t.trim())
    .find(|t| !t.is_empty())
    .map(str::to_string)
    .ok_or(ConfigError::MissingToken)
}
