//! Pull request creation.

use pipeline::{ApiToken, HostingError, PullRequestDraft, PullRequestOutcome, SoftFailure};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::client::GitHubClient;
use crate::queries::{CreatePullRequestData, CREATE_PULL_REQUEST};

/// Opens pull requests from the rolling branch.
///
/// Every call attempts a new pull request; an already open one for the same
/// branch pair makes the API answer with an error, which surfaces as
/// [`PullRequestOutcome::NotOpened`].
#[derive(Debug, Clone)]
pub struct PullRequestPublisher {
    client: GitHubClient,
}

impl PullRequestPublisher {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    #[instrument(skip_all, fields(head = %draft.head, base = %draft.base))]
    pub async fn create_pull_request(
        &self,
        token: &ApiToken,
        draft: &PullRequestDraft,
    ) -> Result<PullRequestOutcome, HostingError> {
        let input = json!({
            "input": {
                "repositoryId": draft.repository.as_str(),
                "baseRefName": draft.base.as_str(),
                "headRefName": draft.head.as_str(),
                "title": draft.title,
                "body": draft.body,
            }
        });
        let response = self
            .client
            .query::<CreatePullRequestData>(token, CREATE_PULL_REQUEST, input)
            .await?;

        if response.has_errors() {
            let failure = SoftFailure::new("pull request rejected", response.error_messages());
            warn!(%failure, "Pull request not opened");
            return Ok(PullRequestOutcome::NotOpened(failure));
        }

        match response
            .data
            .and_then(|d| d.create_pull_request)
            .and_then(|p| p.pull_request)
        {
            Some(node) => {
                info!(number = node.number, url = %node.url, "Pull request opened");
                Ok(PullRequestOutcome::Opened(node.into()))
            }
            None => {
                let failure = SoftFailure::new("pull request missing from response", Vec::new());
                warn!(%failure, "Pull request not opened");
                Ok(PullRequestOutcome::NotOpened(failure))
            }
        }
    }
}
