//! Ports for the local working copy and content materialisation.
//!
//! Implemented by the `working-copy` crate with the `git` executable and the
//! local filesystem. Every call names the working directory explicitly; no
//! implementation may assume a shared fixed path.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    ApiToken, BranchName, CommitIdentity, CommitOutcome, ProjectName, PullOutcome, RetryPolicy,
    Substitutions, UserLogin,
};

/// Errors raised by working-copy and materialisation operations.
#[derive(Debug, Error)]
pub enum WorkingCopyError {
    /// A filesystem operation failed.
    #[error("I/O error at {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// The `git` executable could not be started.
    #[error("Cannot run git: {message}")]
    Spawn { message: String },

    /// A git command exited unsuccessfully. `stderr` has secrets redacted.
    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },

    /// Pushing the rolling branch failed. Deliberately carries no detail from
    /// the underlying failure: its output may contain the credentialed URL.
    #[error("Error while pushing changes to branch {branch} for {login}/{project}")]
    PushFailed {
        login: UserLogin,
        project: ProjectName,
        branch: BranchName,
    },
}

impl WorkingCopyError {
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            // Push and fetch failures are usually network or auth hiccups.
            Self::PushFailed { .. } | Self::CommandFailed { .. } => {
                RetryPolicy::Retryable { after: None }
            }
            Self::Io { .. } | Self::Spawn { .. } => RetryPolicy::NonRetryable,
        }
    }
}

/// Arguments for pushing the rolling branch with the user's credential.
#[derive(Debug, Clone, Copy)]
pub struct PushRequest<'a> {
    pub token: &'a ApiToken,
    pub identity: &'a CommitIdentity,
    pub login: &'a UserLogin,
    pub project: &'a ProjectName,
    pub branch: &'a BranchName,
}

/// Local version-control operations for one publish run, in call order.
#[async_trait]
pub trait WorkingCopy: Send + Sync {
    /// Removes anything at `path`. A missing path is success.
    async fn ensure_clean(&self, path: &Path) -> Result<(), WorkingCopyError>;

    /// Full clone of `remote_url` into `path`.
    async fn clone_repository(&self, remote_url: &str, path: &Path)
        -> Result<(), WorkingCopyError>;

    /// Force-creates (or resets) `branch` at the current HEAD and checks it out.
    async fn checkout_branch(&self, path: &Path, branch: &BranchName)
        -> Result<(), WorkingCopyError>;

    /// Pulls `branch` from `remote_url` only if the remote has it.
    async fn pull_if_remote_branch_exists(
        &self,
        remote_url: &str,
        path: &Path,
        branch: &BranchName,
        identity: &CommitIdentity,
    ) -> Result<PullOutcome, WorkingCopyError>;

    /// Stages and commits exactly `files` (relative to `path`).
    async fn commit(
        &self,
        path: &Path,
        identity: &CommitIdentity,
        files: &[PathBuf],
        message: &str,
    ) -> Result<CommitOutcome, WorkingCopyError>;

    /// Pushes the rolling branch using the user's credential.
    async fn push(&self, path: &Path, request: PushRequest<'_>) -> Result<(), WorkingCopyError>;

    /// Deletes the working copy at the end of a run.
    async fn discard(&self, path: &Path) -> Result<(), WorkingCopyError>;
}

/// Rewrites placeholder tokens in a file of the working copy.
#[async_trait]
pub trait ContentMaterializer: Send + Sync {
    /// Replaces every occurrence of every placeholder in `entry_file`, in
    /// place. Returns the number of replacements made.
    async fn materialize(
        &self,
        entry_file: &Path,
        substitutions: &Substitutions,
    ) -> Result<usize, WorkingCopyError>;
}
