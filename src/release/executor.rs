//! Git object writes for the release commit.
//!
//! The branch only moves at the final ref update. Blobs, the tree and the
//! commit are unreferenced until then, so a failure anywhere earlier leaves
//! the branch exactly as it was.

use tracing::{debug, info};

use crate::error::ReleaseError;
use crate::github::{BranchHead, REGULAR_FILE_MODE, SourceHost, TreeEntry};

/// New content for one file in the release commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub content: String,
}

impl FileChange {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Write all changes as one commit on top of `head` and move `branch` to it.
///
/// Steps:
/// 1. Create one blob per changed file
/// 2. Create a tree on the head commit's tree with those blobs
/// 3. Create a commit whose only parent is the head commit
/// 4. Fast-forward the branch to the new commit
///
/// Returns the new commit's sha.
pub async fn commit_files<H>(
    host: &H,
    branch: &str,
    head: &BranchHead,
    message: &str,
    changes: &[FileChange],
) -> Result<String, ReleaseError>
where
    H: SourceHost + ?Sized,
{
    let mut entries = Vec::with_capacity(changes.len());
    for change in changes {
        let blob_sha = host.create_blob(&change.content).await?;
        debug!("Created blob {} for {}", blob_sha, change.path);
        entries.push(TreeEntry {
            path: change.path.clone(),
            mode: REGULAR_FILE_MODE.to_string(),
            blob_sha,
        });
    }

    let tree_sha = host.create_tree(&entries, &head.tree_sha).await?;
    let commit_sha = host
        .create_commit(message, &tree_sha, &head.commit_sha)
        .await?;
    debug!("Created commit {} with tree {}", commit_sha, tree_sha);

    host.update_ref(branch, &commit_sha)
        .await
        .map_err(|source| ReleaseError::RefUpdateRejected {
            branch: branch.to_string(),
            source,
        })?;
    info!("Moved {} to {}", branch, commit_sha);

    Ok(commit_sha)
}
