//! Fixed parameters of every publish run.

use std::path::{Component, PathBuf};

use pipeline::{BranchName, CommitIdentity, ProjectName, PublishError};

/// Repository name created under each user's namespace.
pub const DEFAULT_PROJECT: &str = "deckdeckgo-deck";
/// Rolling branch that every publish commits to.
pub const DEFAULT_BRANCH: &str = "deckdeckgo";
/// Pull request base used when the repository reports no default branch.
pub const DEFAULT_FALLBACK_BASE: &str = "master";
/// Template file that receives the title and author.
pub const DEFAULT_ENTRY_FILE: &str = "src/index.html";
pub const DEFAULT_COMMIT_MESSAGE: &str = "feat: last changes";
pub const DEFAULT_PULL_REQUEST_TITLE: &str = "Update presentation";
pub const DEFAULT_PULL_REQUEST_BODY: &str = "Latest changes published with DeckDeckGo.";

/// Settings shared by all runs of one [`crate::PublishOrchestrator`].
///
/// Checked once by [`PublishSettings::validate`] when the orchestrator is
/// built; a run never starts with invalid settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
    /// Author and committer of every publish commit.
    pub identity: CommitIdentity,
    pub project: ProjectName,
    pub branch: BranchName,
    pub fallback_base: BranchName,
    /// Path of the entry file, relative to the repository root.
    pub entry_file: PathBuf,
    pub commit_message: String,
    pub pull_request_title: String,
    pub pull_request_body: String,
    /// Parent directory of the per-run working directories.
    pub scratch_root: PathBuf,
}

impl PublishSettings {
    /// Default settings for `identity`, with working copies under `scratch_root`.
    pub fn new(identity: CommitIdentity, scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            identity,
            project: ProjectName::from_static(DEFAULT_PROJECT),
            branch: BranchName::from_static(DEFAULT_BRANCH),
            fallback_base: BranchName::from_static(DEFAULT_FALLBACK_BASE),
            entry_file: PathBuf::from(DEFAULT_ENTRY_FILE),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            pull_request_title: DEFAULT_PULL_REQUEST_TITLE.to_string(),
            pull_request_body: DEFAULT_PULL_REQUEST_BODY.to_string(),
            scratch_root: scratch_root.into(),
        }
    }

    pub fn validate(&self) -> Result<(), PublishError> {
        if self.identity.name.trim().is_empty() {
            return Err(PublishError::configuration("commit author name is empty"));
        }
        if self.identity.email.trim().is_empty() {
            return Err(PublishError::configuration("commit author email is empty"));
        }
        if self.commit_message.trim().is_empty() {
            return Err(PublishError::configuration("commit message is empty"));
        }
        if self.pull_request_title.trim().is_empty() {
            return Err(PublishError::configuration("pull request title is empty"));
        }
        if self.branch == self.fallback_base {
            return Err(PublishError::configuration(format!(
                "rolling branch '{}' cannot also be the pull request base",
                self.branch
            )));
        }
        if self.scratch_root.as_os_str().is_empty() {
            return Err(PublishError::configuration("scratch root is empty"));
        }

        // The entry file must stay inside the working copy.
        let mut components = self.entry_file.components().peekable();
        if components.peek().is_none()
            || !components.all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(PublishError::configuration(format!(
                "entry file '{}' must be a relative path inside the repository",
                self.entry_file.display()
            )));
        }
        Ok(())
    }
}
