//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use release_helper::error::HostError;
use release_helper::github::{
    BranchHead, CommitSource, PullRequest, RepoFile, SourceHost, TreeEntry,
};
use release_helper::RawCommit;

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a changelog fixture.
pub fn changelog_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("changelogs").join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// Build a commit authored by `login`.
pub fn commit(sha: &str, message: &str, login: &str) -> RawCommit {
    RawCommit {
        sha: sha.to_string(),
        message: message.to_string(),
        author_login: Some(login.to_string()),
        author_name: login.to_string(),
        author_email: format!("{}@example.com", login),
    }
}

#[derive(Default)]
struct RepoState {
    /// Branch name -> head commit sha.
    branches: HashMap<String, String>,
    /// Commit sha -> tree sha.
    commit_trees: HashMap<String, String>,
    /// Commit sha -> parent sha.
    commit_parents: HashMap<String, String>,
    /// Tree sha -> path -> content.
    trees: HashMap<String, BTreeMap<String, String>>,
    blobs: HashMap<String, String>,
    commit_messages: HashMap<String, String>,
    /// Branch name -> commits, newest first.
    history: HashMap<String, Vec<RawCommit>>,
    pull_request_branches: HashMap<u64, String>,
    pull_requests: Vec<PullRequest>,
    labels: HashMap<String, Vec<String>>,
    members: HashSet<String>,
    next_id: u32,
    ref_updates: u32,
    membership_lookups: u32,
    reject_ref_updates: bool,
}

impl RepoState {
    fn next_sha(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", kind, self.next_id)
    }
}

/// In-memory repository host.
///
/// Trees, commits and refs behave like the git data API: objects are created
/// unreferenced and only `update_ref` moves a branch, as a fast-forward.
#[derive(Default)]
pub struct FakeHost {
    state: Mutex<RepoState>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a branch whose head tree holds `files`. `commits` are newest first;
    /// the first one becomes the head.
    pub fn with_branch(self, branch: &str, files: &[(&str, &str)], commits: Vec<RawCommit>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let tree_sha = format!("tree-{}", branch);
            let head_sha = commits
                .first()
                .map(|c| c.sha.clone())
                .unwrap_or_else(|| format!("head-{}", branch));

            state.trees.insert(
                tree_sha.clone(),
                files
                    .iter()
                    .map(|(p, c)| (p.to_string(), c.to_string()))
                    .collect(),
            );
            state.commit_trees.insert(head_sha.clone(), tree_sha);
            state.branches.insert(branch.to_string(), head_sha);
            state.history.insert(branch.to_string(), commits);
        }
        self
    }

    /// Make pull request `number` list the commits of `branch`.
    pub fn with_pull_request_commits(self, number: u64, branch: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .pull_request_branches
            .insert(number, branch.to_string());
        self
    }

    pub fn with_pull_request(self, pull: PullRequest) -> Self {
        self.state.lock().unwrap().pull_requests.push(pull);
        self
    }

    pub fn with_labels(self, issue: &str, labels: &[&str]) -> Self {
        self.state.lock().unwrap().labels.insert(
            issue.to_string(),
            labels.iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    pub fn with_member(self, login: &str) -> Self {
        self.state.lock().unwrap().members.insert(login.to_string());
        self
    }

    /// Reject every ref update, as for a branch that moved in the meantime.
    pub fn rejecting_ref_updates(self) -> Self {
        self.state.lock().unwrap().reject_ref_updates = true;
        self
    }

    /// Push `commit` on top of `branch` without changing any file.
    pub fn push_commit(&self, branch: &str, commit: RawCommit) {
        let mut state = self.state.lock().unwrap();
        let parent = state.branches.get(branch).cloned().unwrap_or_default();
        let tree = state.commit_trees.get(&parent).cloned().unwrap_or_default();

        state.commit_trees.insert(commit.sha.clone(), tree);
        state.commit_parents.insert(commit.sha.clone(), parent);
        state.branches.insert(branch.to_string(), commit.sha.clone());
        state
            .history
            .entry(branch.to_string())
            .or_default()
            .insert(0, commit);
    }

    pub fn branch_sha(&self, branch: &str) -> Option<String> {
        self.state.lock().unwrap().branches.get(branch).cloned()
    }

    /// Content of `path` at the head of `branch`.
    pub fn branch_file(&self, branch: &str, path: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        let head = state.branches.get(branch)?;
        let tree = state.commit_trees.get(head)?;
        state.trees.get(tree)?.get(path).cloned()
    }

    /// Message of the newest commit on `branch`.
    pub fn head_message(&self, branch: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .history
            .get(branch)?
            .first()
            .map(|c| c.message.clone())
    }

    pub fn ref_updates(&self) -> u32 {
        self.state.lock().unwrap().ref_updates
    }

    pub fn membership_lookups(&self) -> u32 {
        self.state.lock().unwrap().membership_lookups
    }
}

#[async_trait]
impl SourceHost for FakeHost {
    async fn commits(&self, source: &CommitSource) -> Result<Vec<RawCommit>, HostError> {
        let state = self.state.lock().unwrap();
        let branch = match source {
            CommitSource::PullRequest(number) => match state.pull_request_branches.get(number) {
                Some(branch) => branch.clone(),
                None => return Ok(Vec::new()),
            },
            CommitSource::Branch(name) => name.clone(),
        };
        Ok(state.history.get(&branch).cloned().unwrap_or_default())
    }

    async fn issue_labels(&self, issue: &str) -> Result<Vec<String>, HostError> {
        let state = self.state.lock().unwrap();
        Ok(state.labels.get(issue).cloned().unwrap_or_default())
    }

    async fn file(&self, path: &str, git_ref: &str) -> Result<Option<RepoFile>, HostError> {
        let state = self.state.lock().unwrap();
        let commit = state.branches.get(git_ref).map(String::as_str).unwrap_or(git_ref);

        let content = state
            .commit_trees
            .get(commit)
            .and_then(|tree| state.trees.get(tree))
            .and_then(|files| files.get(path));

        Ok(content.map(|content| RepoFile {
            sha: format!("file-{}", path),
            content: content.clone(),
        }))
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<BranchHead>, HostError> {
        let state = self.state.lock().unwrap();
        Ok(state.branches.get(branch).and_then(|sha| {
            state.commit_trees.get(sha).map(|tree| BranchHead {
                commit_sha: sha.clone(),
                tree_sha: tree.clone(),
            })
        }))
    }

    async fn create_blob(&self, content: &str) -> Result<String, HostError> {
        let mut state = self.state.lock().unwrap();
        let sha = state.next_sha("blob");
        state.blobs.insert(sha.clone(), content.to_string());
        Ok(sha)
    }

    async fn create_tree(&self, entries: &[TreeEntry], base_tree: &str) -> Result<String, HostError> {
        let mut state = self.state.lock().unwrap();
        let mut files = state.trees.get(base_tree).cloned().unwrap_or_default();

        for entry in entries {
            let content = state
                .blobs
                .get(&entry.blob_sha)
                .cloned()
                .ok_or(HostError::MissingField {
                    operation: "create tree",
                    field: "sha",
                })?;
            files.insert(entry.path.clone(), content);
        }

        let sha = state.next_sha("tree");
        state.trees.insert(sha.clone(), files);
        Ok(sha)
    }

    async fn create_commit(&self, message: &str, tree: &str, parent: &str) -> Result<String, HostError> {
        let mut state = self.state.lock().unwrap();
        let sha = state.next_sha("commit");
        state.commit_trees.insert(sha.clone(), tree.to_string());
        state.commit_parents.insert(sha.clone(), parent.to_string());
        state.commit_messages.insert(sha.clone(), message.to_string());
        Ok(sha)
    }

    async fn update_ref(&self, branch: &str, commit: &str) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();

        let fast_forward = state.commit_parents.get(commit) == state.branches.get(branch);
        if state.reject_ref_updates || !fast_forward {
            return Err(HostError::MissingField {
                operation: "update branch ref",
                field: "object.sha",
            });
        }

        let message = state
            .commit_messages
            .get(commit)
            .cloned()
            .unwrap_or_default();

        state.branches.insert(branch.to_string(), commit.to_string());
        state
            .history
            .entry(branch.to_string())
            .or_default()
            .insert(0, commit_by_action(commit, &message));
        state.ref_updates += 1;
        Ok(())
    }

    async fn pull_request_by_title(&self, title: &str) -> Result<Option<PullRequest>, HostError> {
        let state = self.state.lock().unwrap();
        let wanted = title.to_lowercase();
        Ok(state
            .pull_requests
            .iter()
            .find(|p| p.title.to_lowercase() == wanted)
            .cloned())
    }

    async fn is_organization_member(&self, login: &str) -> Result<bool, HostError> {
        let mut state = self.state.lock().unwrap();
        state.membership_lookups += 1;
        Ok(state.members.contains(login))
    }
}

fn commit_by_action(sha: &str, message: &str) -> RawCommit {
    RawCommit {
        sha: sha.to_string(),
        message: message.to_string(),
        author_login: Some("github-actions[bot]".to_string()),
        author_name: "github-actions[bot]".to_string(),
        author_email: "github-actions[bot]@users.noreply.github.com".to_string(),
    }
}
