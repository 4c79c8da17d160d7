//! Release operations: preparing a release PR and building release notes.
//!
//! Preparing a release writes a new CHANGELOG block and bumps version strings
//! in one commit on the release branch. Release notes are returned as text for
//! the workflow to publish. Neither operation touches the repository when a
//! guard does not match.

pub mod branch;
pub mod executor;
pub mod output;
pub mod version_files;

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::changelog::{ChangelogEntry, prepend_block, release_notes_text, render_simple};
use crate::commits::{
    StopRule, collect_entries, is_release_commit_for, release_commit_message, select_window,
};
use crate::config::{Operation, ReleaseConfig};
use crate::error::ReleaseError;
use crate::github::{BranchHead, CommitSource, SourceHost};

pub use branch::{is_release_pull_request, pr_number_from_ref, version_from_branch};
pub use executor::{FileChange, commit_files};
pub use output::{NO_RELEASE_NOTES, UNABLE_TO_CREATE, default_output, encode_output};
pub use version_files::{
    VersionLocation, apply_placeholders, compute_replacements, normalize_path, parse_declarations,
};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The operation input was not recognised.
    InvalidOperation(String),
    /// The event did not match the operation's guards.
    Skipped(String),
    /// The release branch already holds this version's release commit or
    /// every change it would make.
    AlreadyPrepared { version: String },
    /// No commit referenced an issue.
    NothingToDo,
    Prepared {
        version: String,
        commit_sha: String,
        files: Vec<String>,
    },
    /// No pull request titled `Release/<tag>` exists.
    PullRequestNotFound { title: String },
    ReleaseNotes(String),
}

impl Outcome {
    /// The text this outcome publishes.
    pub fn payload(&self) -> &str {
        match self {
            Self::ReleaseNotes(text) => text.as_str(),
            Self::PullRequestNotFound { .. } => UNABLE_TO_CREATE,
            _ => NO_RELEASE_NOTES,
        }
    }

    /// The encoded line printed for the caller.
    pub fn output_line(&self) -> String {
        encode_output(self.payload())
    }
}

/// Runs one release operation against a repository host.
pub struct ReleaseManager<'a, H: SourceHost + ?Sized> {
    host: &'a H,
    config: &'a ReleaseConfig,
    release_date: NaiveDate,
}

impl<'a, H: SourceHost + ?Sized> ReleaseManager<'a, H> {
    /// Create a manager dated today (UTC).
    pub fn new(host: &'a H, config: &'a ReleaseConfig) -> Self {
        Self {
            host,
            config,
            release_date: Utc::now().date_naive(),
        }
    }

    /// Use a fixed date for CHANGELOG blocks.
    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = date;
        self
    }

    /// Run the configured operation.
    pub async fn run(&self) -> Result<Outcome, ReleaseError> {
        match &self.config.operation {
            Operation::PrepareForRelease => self.prepare_release().await,
            Operation::GithubReleaseNotes => self.release_notes().await,
            Operation::Unknown(input) => {
                warn!(
                    "Unexpected operation '{}'. Expected 'prepare for release' or 'github release notes'.",
                    input
                );
                Ok(Outcome::InvalidOperation(input.clone()))
            }
        }
    }

    /// Add a CHANGELOG block and bump version strings on the release branch.
    pub async fn prepare_release(&self) -> Result<Outcome, ReleaseError> {
        info!("Running 'prepare for release'");
        let event = &self.config.event;

        if !event.is_pull_request() {
            warn!("'prepare for release' needs a pull_request event, got '{}'", event.event_name);
            return Ok(Outcome::Skipped(format!("not a pull request event: {}", event.event_name)));
        }

        if !is_release_pull_request(&event.base_ref, &event.head_ref) {
            info!(
                "PR from '{}' into '{}' is not a release PR, nothing to prepare",
                event.head_ref, event.base_ref
            );
            return Ok(Outcome::Skipped(format!(
                "not a release PR: {} -> {}",
                event.head_ref, event.base_ref
            )));
        }

        let Some(version) = version_from_branch(&event.head_ref) else {
            warn!("Could not read a version from branch '{}'", event.head_ref);
            return Ok(Outcome::Skipped(format!("no version in branch {}", event.head_ref)));
        };
        let version = version.to_string();

        let Some(number) = pr_number_from_ref(&event.ref_name) else {
            warn!("Could not read a PR number from '{}'", event.ref_name);
            return Ok(Outcome::Skipped(format!("no PR number in {}", event.ref_name)));
        };

        info!("Fetching commits of PR #{} for version {}", number, version);
        let commits = self
            .host
            .commits(&CommitSource::PullRequest(number))
            .await?;
        let window = select_window(&commits, Some(&version), StopRule::PrepareMarker);
        debug!("{} of {} commits are in the release window", window.len(), commits.len());

        if window
            .first()
            .is_some_and(|newest| is_release_commit_for(newest, &version))
        {
            warn!(
                "The newest commit is already '{}'. Has this action run before?",
                release_commit_message(&version)
            );
            return Ok(Outcome::AlreadyPrepared { version });
        }

        let entries = collect_entries(self.host, window).await?;
        if entries.is_empty() {
            info!("No commits reference an issue. Nothing to do.");
            return Ok(Outcome::NothingToDo);
        }

        let Some(head) = self.host.branch_head(&event.head_ref).await? else {
            warn!("Branch '{}' was not found", event.head_ref);
            return Ok(Outcome::Skipped(format!("branch {} not found", event.head_ref)));
        };

        let mut changes: Vec<FileChange> = self
            .changelog_change(&version, &entries, &head)
            .await?
            .into_iter()
            .collect();
        changes.extend(self.version_file_changes(&version, &head).await?);

        if changes.is_empty() {
            warn!(
                "Branch '{}' already has the CHANGELOG and versions for {}. Has this action run before?",
                event.head_ref, version
            );
            return Ok(Outcome::AlreadyPrepared { version });
        }

        let commit_sha = commit_files(
            self.host,
            &event.head_ref,
            &head,
            &release_commit_message(&version),
            &changes,
        )
        .await?;

        let files: Vec<String> = changes.into_iter().map(|c| c.path).collect();
        info!("Committed {} for version {}", files.join(", "), version);

        Ok(Outcome::Prepared {
            version,
            commit_sha,
            files,
        })
    }

    /// Build release notes for the tag being pushed.
    pub async fn release_notes(&self) -> Result<Outcome, ReleaseError> {
        info!("Running 'github release notes'");
        let event = &self.config.event;

        if !event.is_tag() {
            warn!("'github release notes' needs a tag, got ref type '{}'", event.ref_type);
            return Ok(Outcome::Skipped(format!("not a tag: {}", event.ref_name)));
        }

        let tag = event.ref_name.as_str();
        let title = format!("Release/{}", tag);

        let Some(pull) = self.host.pull_request_by_title(&title).await? else {
            warn!("No PR titled '{}' was found", title);
            return Ok(Outcome::PullRequestNotFound { title });
        };
        info!("Using description of PR #{}", pull.number);

        let commits = self
            .host
            .commits(&CommitSource::Branch(pull.base_branch.clone()))
            .await?;
        let version = tag.trim_start_matches('v');
        let window = select_window(&commits, Some(version), StopRule::PrepareOrMerge);
        debug!("{} of {} commits are in the release window", window.len(), commits.len());

        let entries = collect_entries(self.host, window).await?;
        if entries.is_empty() {
            info!("No commits reference an issue. No release notes needed.");
            return Ok(Outcome::NothingToDo);
        }

        Ok(Outcome::ReleaseNotes(release_notes_text(
            &pull.description,
            &entries,
        )))
    }

    /// The new CHANGELOG, or `None` when the release branch already has it.
    async fn changelog_change(
        &self,
        version: &str,
        entries: &[ChangelogEntry],
        head: &BranchHead,
    ) -> Result<Option<FileChange>, ReleaseError> {
        let path = normalize_path(&self.config.changelog_path);
        let base = &self.config.event.base_ref;

        let existing = match self.host.file(path, base).await? {
            Some(file) => file.content,
            None => {
                info!("No {} on {}, starting a new one", path, base);
                String::new()
            }
        };

        let date = self.release_date.format("%Y-%m-%d").to_string();
        let block = render_simple(version, &date, entries);

        let content = prepend_block(&block, &existing);

        if let Some(current) = self.host.file(path, &head.commit_sha).await? {
            if current.content == content {
                debug!("{} on {} already has the {} block", path, self.config.event.head_ref, version);
                return Ok(None);
            }
        }

        Ok(Some(FileChange::new(path, content)))
    }

    /// Version file updates. Problems with the declarations skip this step.
    async fn version_file_changes(
        &self,
        version: &str,
        head: &BranchHead,
    ) -> Result<Vec<FileChange>, ReleaseError> {
        let Some(declaration_path) = self.config.version_script_path.as_deref() else {
            return Ok(Vec::new());
        };
        let declaration_path = normalize_path(declaration_path);

        let Some(declarations) = self.host.file(declaration_path, &head.commit_sha).await? else {
            warn!("Version declarations '{}' not found, skipping version files", declaration_path);
            return Ok(Vec::new());
        };

        let locations = match parse_declarations(declaration_path, &declarations.content) {
            Ok(locations) => locations,
            Err(e) => {
                warn!("Skipping version files: {}", e);
                return Ok(Vec::new());
            }
        };

        let mut current = HashMap::new();
        for location in &locations {
            let path = normalize_path(&location.path);
            if current.contains_key(path) {
                continue;
            }
            match self.host.file(path, &head.commit_sha).await? {
                Some(file) => {
                    current.insert(path.to_string(), file.content);
                }
                None => warn!("Version file '{}' not found, skipping it", path),
            }
        }

        let changed = match compute_replacements(&locations, &current, version) {
            Ok(changed) => changed,
            Err(e) => {
                warn!("Skipping version files: {}", e);
                return Ok(Vec::new());
            }
        };

        for path in current.keys().filter(|p| !changed.contains_key(*p)) {
            debug!("{} already has version {}", path, version);
        }

        Ok(changed
            .into_iter()
            .map(|(path, content)| FileChange::new(path, content))
            .collect())
    }
}
