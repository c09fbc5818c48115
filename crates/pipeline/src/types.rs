//! Shared value types for the publish domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! several related values and, in the case of the tagged outcome enums,
//! encode the difference between "nothing to do" and "something broke".

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    BranchName, DocumentId, OwnerId, ProjectName, PublishRunId, RepositoryNodeId, UserLogin,
    UserNodeId,
};

// ---------------------------------------------------------------------------
// Remote entities
// ---------------------------------------------------------------------------

/// The hosting user that owns the credential, as reported by the API.
///
/// Recomputed on every publish; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    /// GraphQL node id (used as the owner of newly created repositories).
    pub id: UserNodeId,
    /// Handle used in repository paths and push URLs.
    pub login: UserLogin,
}

/// A repository on the hosting service, either discovered or freshly created
/// from the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    /// GraphQL node id, used when opening pull requests.
    pub id: RepositoryNodeId,
    /// Clone URL (HTTPS, no credentials).
    pub url: String,
    /// `"owner/name"`.
    pub full_name: String,
    /// Default branch, when the API reported one. A freshly cloned template
    /// has no default branch until the backend has finished copying it.
    pub default_branch: Option<BranchName>,
}

/// A pull request that was successfully opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: String,
    pub number: u64,
    pub url: String,
}

/// Everything needed to open a pull request from the rolling branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDraft {
    pub repository: RepositoryNodeId,
    pub head: BranchName,
    pub base: BranchName,
    pub title: String,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Tagged outcomes
// ---------------------------------------------------------------------------

/// A remote call that completed at the transport layer but produced no
/// usable result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftFailure {
    /// Short description of what was missing.
    pub reason: String,
    /// Messages from the API-level `errors` array, if any.
    pub api_errors: Vec<String>,
}

impl SoftFailure {
    pub fn new(reason: impl Into<String>, api_errors: Vec<String>) -> Self {
        Self {
            reason: reason.into(),
            api_errors,
        }
    }
}

impl std::fmt::Display for SoftFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.api_errors.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{} ({})", self.reason, self.api_errors.join("; "))
        }
    }
}

/// Result of locating or provisioning the target repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryResolution {
    /// The repository already existed under the user's namespace.
    Existing(RemoteRepository),
    /// The repository was created from the template and has settled.
    Created(RemoteRepository),
    /// The API answered but gave nothing usable.
    Unavailable(SoftFailure),
}

/// Result of asking the host to open a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestOutcome {
    Opened(PullRequest),
    NotOpened(SoftFailure),
}

/// Whether the rolling branch had to be pulled from the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    Pulled,
    /// The remote has no such branch yet; no pull was attempted.
    RemoteBranchMissing,
}

/// Whether a commit was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The enumerated files carried no change; nothing was committed.
    Unchanged,
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Identity recorded on commits made by the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

/// Placeholder token → replacement value.
///
/// Iteration order is deterministic so materialisation is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions(BTreeMap<String, String>);

impl Substitutions {
    /// Marker replaced with the document title.
    pub const TITLE: &'static str = "{{DECKDECKGO_TITLE}}";
    /// Marker replaced with the author's display name.
    pub const AUTHOR: &'static str = "{{DECKDECKGO_AUTHOR}}";

    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the standard title/author substitution set.
    pub fn for_deck(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self::new()
            .with(Self::TITLE, title)
            .with(Self::AUTHOR, author)
    }

    /// Adds (or replaces) one placeholder.
    pub fn with(mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(placeholder.into(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Per-run context
// ---------------------------------------------------------------------------

/// Context threaded through every component call for one publish run.
///
/// The working directory is unique per run so concurrent publishes sharing a
/// filesystem never touch each other's working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub run_id: PublishRunId,
    pub owner: OwnerId,
    pub document: DocumentId,
    pub project: ProjectName,
    pub branch: BranchName,
    work_dir: PathBuf,
}

impl RunContext {
    /// Creates a context whose working directory lives under `scratch_root`.
    ///
    /// The directory name is `<project>-<owner>-<run_id>`; characters outside
    /// `[A-Za-z0-9._-]` in the owner id are replaced with `_`.
    pub fn new(
        run_id: PublishRunId,
        owner: OwnerId,
        document: DocumentId,
        project: ProjectName,
        branch: BranchName,
        scratch_root: &Path,
    ) -> Self {
        let owner_segment: String = owner
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let work_dir = scratch_root.join(format!("{project}-{owner_segment}-{run_id}"));
        Self {
            run_id,
            owner,
            document,
            project,
            branch,
            work_dir,
        }
    }

    /// Private working directory for this run.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
