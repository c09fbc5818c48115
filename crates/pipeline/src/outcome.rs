//! Run stages, terminal outcomes and structured failure records.
//!
//! A publish never reports failure to whatever triggered it. Instead each
//! run ends in a [`PublishOutcome`], and failed runs additionally produce a
//! [`PublishFailureRecord`] that is handed to a [`FailureReporter`] so it can
//! be queried later.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    DocumentId, OwnerId, PublishError, PublishRunId, PullRequest, RemoteRepository, RetryPolicy,
    Timestamp,
};

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Linear state sequence of one publish run.
///
/// A failure record names the last stage that was **reached**, so a failure
/// with `stage == Cloned` happened while preparing the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStage {
    Idle,
    PreconditionsChecked,
    CredentialResolved,
    UserResolved,
    RepositoryResolved,
    Cloned,
    BranchReady,
    PulledIfApplicable,
    ContentMaterialized,
    Committed,
    Pushed,
    PullRequestOpened,
    Done,
}

impl std::fmt::Display for PublishStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::PreconditionsChecked => "preconditions_checked",
            Self::CredentialResolved => "credential_resolved",
            Self::UserResolved => "user_resolved",
            Self::RepositoryResolved => "repository_resolved",
            Self::Cloned => "cloned",
            Self::BranchReady => "branch_ready",
            Self::PulledIfApplicable => "pulled_if_applicable",
            Self::ContentMaterialized => "content_materialized",
            Self::Committed => "committed",
            Self::Pushed => "pushed",
            Self::PullRequestOpened => "pull_request_opened",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a change did not lead to a publish. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The change has no `after` snapshot.
    DocumentDeleted,
    NotPublished,
    MissingPathname,
    MissingOwner,
    /// The transition does not newly require publishing.
    AlreadyPublished,
    NoCredential,
    /// A credential record exists but carries no usable token.
    MalformedCredential,
    UserUnresolved { detail: String },
    RepositoryUnavailable { detail: String },
    MissingRepositoryUrl,
}

/// Terminal result of one publish run.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    Published {
        repository: RemoteRepository,
        /// `None` when the host answered without opening the pull request.
        pull_request: Option<PullRequest>,
    },
    Skipped(SkipReason),
    Failed(PublishFailureRecord),
}

// ---------------------------------------------------------------------------
// Failure records
// ---------------------------------------------------------------------------

/// Queryable record of a failed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishFailureRecord {
    pub run_id: PublishRunId,
    pub owner: OwnerId,
    pub document: DocumentId,
    /// Last stage reached before the failure.
    pub stage: PublishStage,
    pub kind: String,
    pub message: String,
    pub retry_policy: RetryPolicy,
    pub occurred_at: Timestamp,
}

impl PublishFailureRecord {
    pub fn new(
        run_id: PublishRunId,
        owner: OwnerId,
        document: DocumentId,
        stage: PublishStage,
        error: &PublishError,
    ) -> Self {
        Self {
            run_id,
            owner,
            document,
            stage,
            kind: error.kind().to_string(),
            message: error.to_string(),
            retry_policy: error.retry_policy(),
            occurred_at: Timestamp::now(),
        }
    }
}

/// Destination for failure records.
///
/// Reporting is best effort: implementations log their own problems and
/// never fail the run a second time.
#[async_trait]
pub trait FailureReporter: Send + Sync {
    async fn report(&self, record: &PublishFailureRecord);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered_along_the_pipeline() {
        assert!(PublishStage::Idle < PublishStage::Cloned);
        assert!(PublishStage::Pushed < PublishStage::PullRequestOpened);
        assert_eq!(PublishStage::BranchReady.to_string(), "branch_ready");
    }

    #[test]
    fn failure_record_serialises_stage_and_kind() {
        let error = PublishError::configuration("empty author");
        let record = PublishFailureRecord::new(
            PublishRunId::new_random(),
            OwnerId::new("alice").unwrap(),
            DocumentId::new("deck-1").unwrap(),
            PublishStage::Cloned,
            &error,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["stage"], "cloned");
        assert_eq!(json["kind"], "configuration");
        assert_eq!(json["owner"], "alice");
        assert_eq!(json["retry_policy"]["policy"], "non_retryable");
    }
}
