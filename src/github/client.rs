//! `SourceHost` implementation backed by the GitHub REST API via octocrab.

use std::future::Future;

use async_trait::async_trait;
use octocrab::models::repos::{Object, RepoCommit};
use octocrab::params::State;
use octocrab::params::repos::Reference;
use octocrab::{Octocrab, Page};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::commits::RawCommit;
use crate::error::{ConfigError, HostError};

use super::host::{BranchHead, CommitSource, PullRequest, RepoFile, SourceHost, TreeEntry};
use super::retry::retry_with_backoff;

const PER_PAGE: u8 = 100;

/// Safety limit to prevent endless pagination.
const MAX_PAGES: u32 = 50;

/// GitHub repository plus the organization whose members count as internal.
pub struct GitHubHost {
    client: Octocrab,
    owner: String,
    repo: String,
    organization: String,
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Deserialize)]
struct CreatedObject {
    sha: String,
}

#[derive(Serialize)]
struct NewBlob<'a> {
    content: &'a str,
    encoding: &'a str,
}

#[derive(Serialize)]
struct NewTree<'a> {
    base_tree: &'a str,
    tree: Vec<NewTreeEntry<'a>>,
}

#[derive(Serialize)]
struct NewTreeEntry<'a> {
    path: &'a str,
    mode: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    sha: &'a str,
}

#[derive(Serialize)]
struct NewCommit<'a> {
    message: &'a str,
    tree: &'a str,
    parents: [&'a str; 1],
}

#[derive(Serialize)]
struct RefUpdate<'a> {
    sha: &'a str,
    force: bool,
}

fn status_of(err: &octocrab::Error) -> Option<u16> {
    match err {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

fn is_not_found(err: &octocrab::Error) -> bool {
    status_of(err) == Some(404)
}

/// Client errors will not change on retry.
fn is_retryable(err: &octocrab::Error) -> bool {
    !matches!(status_of(err), Some(400..=499))
}

fn raw_commit(commit: RepoCommit) -> RawCommit {
    let (author_name, author_email) = commit
        .commit
        .author
        .map(|a| (a.user.name, a.user.email))
        .unwrap_or_default();

    RawCommit {
        sha: commit.sha,
        message: commit.commit.message,
        author_login: commit.author.map(|a| a.login),
        author_name,
        author_email,
    }
}

impl GitHubHost {
    /// Build a host with a personal access token.
    ///
    /// `api_url` overrides the API base, e.g. for GitHub Enterprise.
    pub fn new(
        token: &str,
        owner: &str,
        repo: &str,
        organization: &str,
        api_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(url) = api_url {
            builder = builder
                .base_uri(url.to_string())
                .map_err(|e| ConfigError::Client(Box::new(e)))?;
        }

        let client = builder
            .build()
            .map_err(|e| ConfigError::Client(Box::new(e)))?;

        Ok(Self::with_client(client, owner, repo, organization))
    }

    /// Use a pre-configured octocrab client.
    ///
    /// This allows dependency injection for testing with mock servers.
    pub fn with_client(client: Octocrab, owner: &str, repo: &str, organization: &str) -> Self {
        Self {
            client,
            owner: owner.to_string(),
            repo: repo.to_string(),
            organization: organization.to_string(),
        }
    }

    fn route(&self, tail: &str) -> String {
        format!("/repos/{}/{}/{}", self.owner, self.repo, tail)
    }

    /// Fetch numbered pages until GitHub stops sending a `next` link.
    ///
    /// Each page is retried on its own. A 404 on the first page is `Ok(None)`.
    async fn collect_pages<T, F, Fut>(
        &self,
        operation: &'static str,
        fetch: F,
    ) -> Result<Option<Vec<T>>, HostError>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = octocrab::Result<Page<T>>>,
    {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let batch = match retry_with_backoff(|| fetch(page), is_retryable).await {
                Ok(batch) => batch,
                Err(e) if page == 1 && is_not_found(&e) => {
                    debug!("{} returned 404 for {}/{}", operation, self.owner, self.repo);
                    return Ok(None);
                }
                Err(e) => return Err(HostError::request(operation, e)),
            };

            items.extend(batch.items);

            if batch.next.is_none() {
                break;
            }

            page += 1;

            if page > MAX_PAGES {
                warn!(
                    "Reached {}-page safety limit while trying to {} for {}/{}",
                    MAX_PAGES, operation, self.owner, self.repo
                );
                break;
            }
        }

        Ok(Some(items))
    }

    async fn pull_request_commits(&self, number: u64) -> Result<Option<Vec<RepoCommit>>, HostError> {
        let route = self.route(&format!("pulls/{}/commits", number));
        let route = route.as_str();
        let client = &self.client;

        self.collect_pages("list commits", move |page| async move {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            client.get::<Page<RepoCommit>, _, _>(route, Some(&params)).await
        })
        .await
    }

    async fn branch_commits(&self, branch: &str) -> Result<Option<Vec<RepoCommit>>, HostError> {
        let (client, owner, repo) = (&self.client, self.owner.as_str(), self.repo.as_str());

        self.collect_pages("list commits", move |page| async move {
            client
                .repos(owner, repo)
                .list_commits()
                .sha(branch)
                .per_page(PER_PAGE)
                .page(page)
                .send()
                .await
        })
        .await
    }
}

#[async_trait]
impl SourceHost for GitHubHost {
    async fn commits(&self, source: &CommitSource) -> Result<Vec<RawCommit>, HostError> {
        let listed = match source {
            CommitSource::PullRequest(number) => self.pull_request_commits(*number).await?,
            CommitSource::Branch(name) => self.branch_commits(name).await?,
        };

        let Some(listed) = listed else {
            warn!("Unable to find {:?}, so couldn't get commits", source);
            return Ok(Vec::new());
        };

        let mut commits: Vec<RawCommit> = listed.into_iter().map(raw_commit).collect();

        // Pull request commits are listed oldest first.
        if matches!(source, CommitSource::PullRequest(_)) {
            commits.reverse();
        }

        Ok(commits)
    }

    async fn issue_labels(&self, issue: &str) -> Result<Vec<String>, HostError> {
        let number: u64 = issue
            .parse()
            .map_err(|_| HostError::InvalidIssueNumber(issue.to_string()))?;
        let (client, owner, repo) = (&self.client, self.owner.as_str(), self.repo.as_str());

        let labels = self
            .collect_pages("list issue labels", move |page| async move {
                client
                    .issues(owner, repo)
                    .list_labels_for_issue(number)
                    .per_page(PER_PAGE)
                    .page(page)
                    .send()
                    .await
            })
            .await?;

        match labels {
            Some(labels) => Ok(labels.into_iter().map(|l| l.name).collect()),
            None => {
                warn!("Issue #{} not found", issue);
                Ok(Vec::new())
            }
        }
    }

    async fn file(&self, path: &str, git_ref: &str) -> Result<Option<RepoFile>, HostError> {
        let (client, owner, repo) = (&self.client, self.owner.as_str(), self.repo.as_str());

        let result = retry_with_backoff(
            move || async move {
                client
                    .repos(owner, repo)
                    .get_content()
                    .path(path)
                    .r#ref(git_ref)
                    .send()
                    .await
            },
            is_retryable,
        )
        .await;

        let mut contents = match result {
            Ok(contents) => contents,
            Err(e) if is_not_found(&e) => {
                debug!("Unable to find a file at '{}' in '{}'", path, git_ref);
                return Ok(None);
            }
            Err(e) => return Err(HostError::request("read file", e)),
        };

        let Some(item) = contents.take_items().into_iter().next() else {
            return Ok(None);
        };

        let content = item.decoded_content().ok_or(HostError::MissingField {
            operation: "read file",
            field: "content",
        })?;

        Ok(Some(RepoFile {
            sha: item.sha,
            content,
        }))
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<BranchHead>, HostError> {
        let (client, owner, repo) = (&self.client, self.owner.as_str(), self.repo.as_str());
        let reference = &Reference::Branch(branch.to_string());

        let result = retry_with_backoff(
            move || async move { client.repos(owner, repo).get_ref(reference).await },
            is_retryable,
        )
        .await;

        let head_ref = match result {
            Ok(head_ref) => head_ref,
            Err(e) if is_not_found(&e) => {
                debug!("Branch '{}' not found", branch);
                return Ok(None);
            }
            Err(e) => return Err(HostError::request("read branch", e)),
        };

        let commit_sha = match head_ref.object {
            Object::Commit { sha, .. } => sha,
            _ => {
                return Err(HostError::MissingField {
                    operation: "read branch",
                    field: "object.sha",
                });
            }
        };

        let commit_sha = commit_sha.as_str();

        let commit = retry_with_backoff(
            move || async move { client.commits(owner, repo).get(commit_sha).await },
            is_retryable,
        )
        .await
        .map_err(|e| HostError::request("read branch commit", e))?;

        Ok(Some(BranchHead {
            commit_sha: commit.sha,
            tree_sha: commit.commit.tree.sha,
        }))
    }

    async fn create_blob(&self, content: &str) -> Result<String, HostError> {
        let body = NewBlob {
            content,
            encoding: "utf-8",
        };

        let blob: CreatedObject = self
            .client
            .post(self.route("git/blobs"), Some(&body))
            .await
            .map_err(|e| HostError::request("create blob", e))?;

        Ok(blob.sha)
    }

    async fn create_tree(
        &self,
        entries: &[TreeEntry],
        base_tree: &str,
    ) -> Result<String, HostError> {
        let body = NewTree {
            base_tree,
            tree: entries
                .iter()
                .map(|e| NewTreeEntry {
                    path: &e.path,
                    mode: &e.mode,
                    kind: "blob",
                    sha: &e.blob_sha,
                })
                .collect(),
        };

        let tree: CreatedObject = self
            .client
            .post(self.route("git/trees"), Some(&body))
            .await
            .map_err(|e| HostError::request("create tree", e))?;

        Ok(tree.sha)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parent: &str,
    ) -> Result<String, HostError> {
        let body = NewCommit {
            message,
            tree,
            parents: [parent],
        };

        let commit: CreatedObject = self
            .client
            .post(self.route("git/commits"), Some(&body))
            .await
            .map_err(|e| HostError::request("create commit", e))?;

        Ok(commit.sha)
    }

    async fn update_ref(&self, branch: &str, commit: &str) -> Result<(), HostError> {
        let body = RefUpdate {
            sha: commit,
            force: false,
        };

        let _: serde_json::Value = self
            .client
            .patch(self.route(&format!("git/refs/heads/{}", branch)), Some(&body))
            .await
            .map_err(|e| HostError::request("update branch ref", e))?;

        Ok(())
    }

    async fn pull_request_by_title(&self, title: &str) -> Result<Option<PullRequest>, HostError> {
        let (client, owner, repo) = (&self.client, self.owner.as_str(), self.repo.as_str());

        let pulls = self
            .collect_pages("list pull requests", move |page| async move {
                client
                    .pulls(owner, repo)
                    .list()
                    .state(State::All)
                    .per_page(PER_PAGE)
                    .page(page)
                    .send()
                    .await
            })
            .await?
            .unwrap_or_default();

        let wanted = title.to_lowercase();

        Ok(pulls
            .into_iter()
            .find(|p| {
                p.title
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase() == wanted)
            })
            .map(|p| PullRequest {
                number: p.number,
                title: p.title.unwrap_or_default(),
                base_branch: p.base.ref_field,
                description: p.body.unwrap_or_default(),
            }))
    }

    async fn is_organization_member(&self, login: &str) -> Result<bool, HostError> {
        self.client
            .orgs(self.organization.as_str())
            .check_membership(login)
            .await
            .map_err(|e| HostError::request("check organization membership", e))
    }
}
