//! Port for the hosting service: identity, repositories, pull requests.
//!
//! Implemented by the `github` crate over the GraphQL API. Soft failures
//! (the API answered but gave nothing usable) are returned as tagged
//! outcomes; only transport-level problems and explicit timeouts are errors.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    ApiToken, ProjectName, PullRequestDraft, PullRequestOutcome, RemoteUser,
    RepositoryResolution, RetryPolicy, UserLogin,
};

/// Errors raised by the hosting adapter.
///
/// None of these carry the API token: requests embed it only in a header.
#[derive(Debug, Error)]
pub enum HostingError {
    /// The request never produced an HTTP response (DNS, TLS, connect, timeout).
    #[error("Hosting API request failed: {message}")]
    Transport { message: String },

    /// The API answered with a non-2xx status.
    #[error("Hosting API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a GraphQL JSON envelope.
    #[error("Hosting API response could not be decoded: {message}")]
    Decode { message: String },

    /// The viewer query did not yield an id and login.
    #[error("Cannot resolve the hosting user: {reason}")]
    UserResolution { reason: String },

    /// A repository created from the template did not become usable in time.
    #[error("Repository {owner}/{project} was not ready after {waited:?}")]
    ProvisioningTimeout {
        owner: UserLogin,
        project: ProjectName,
        waited: Duration,
    },
}

impl HostingError {
    /// Whether the same call may succeed if made again later.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Transport { .. } | Self::ProvisioningTimeout { .. } => {
                RetryPolicy::Retryable { after: None }
            }
            Self::Status { status, .. } if *status == 429 || *status >= 500 => {
                RetryPolicy::Retryable { after: None }
            }
            Self::Status { .. } | Self::Decode { .. } | Self::UserResolution { .. } => {
                RetryPolicy::NonRetryable
            }
        }
    }
}

/// Remote operations the publish pipeline needs from the hosting service.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Resolves the user that owns `token`.
    async fn resolve_user(&self, token: &ApiToken) -> Result<RemoteUser, HostingError>;

    /// Finds `<user>/<project>` or provisions it from the template.
    async fn find_or_create_repository(
        &self,
        token: &ApiToken,
        user: &RemoteUser,
        project: &ProjectName,
    ) -> Result<RepositoryResolution, HostingError>;

    /// Opens a pull request. Never reuses an existing one.
    async fn create_pull_request(
        &self,
        token: &ApiToken,
        draft: &PullRequestDraft,
    ) -> Result<PullRequestOutcome, HostingError>;
}
