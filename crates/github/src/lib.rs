//! GitHub infrastructure adapter for the deck publisher.
//!
//! Implements [`pipeline::RepositoryHost`] over the GitHub GraphQL API:
//!
//! - [`client`]: authenticated transport with a uniform error surface.
//! - [`resolver`]: viewer resolution and find-or-create of the target
//!   repository from a template, including the settle wait.
//! - [`pull_request`]: opening the pull request from the rolling branch.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. All GitHub
//! API details (documents, envelopes, error classification, backoff) are
//! handled here; the [`pipeline`] crate never sees them.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    ApiToken, HostingError, ProjectName, PullRequestDraft, PullRequestOutcome, RemoteUser,
    RepositoryHost, RepositoryNodeId, RepositoryResolution,
};

pub mod client;
pub mod pull_request;
mod queries;
pub mod resolver;

pub use client::{
    GitHubClient, GraphQlError, GraphQlResponse, DEFAULT_ENDPOINT, DEFAULT_USER_AGENT,
};
pub use pull_request::PullRequestPublisher;
pub use resolver::{RepositoryResolver, SettlePolicy, DEFAULT_TEMPLATE_REPOSITORY};

/// Settings for [`GitHubHost`].
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,
    pub user_agent: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Template repository cloned for new users.
    pub template_repository: RepositoryNodeId,
    /// Description given to newly created repositories.
    pub repository_description: String,
    pub settle: SettlePolicy,
}

impl GitHubConfig {
    /// Configuration against the public API with the given template.
    pub fn new(template_repository: RepositoryNodeId) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            template_repository,
            repository_description: "Presentation published with DeckDeckGo".to_string(),
            settle: SettlePolicy::default(),
        }
    }
}

/// [`RepositoryHost`] backed by the GitHub GraphQL API.
#[derive(Debug, Clone)]
pub struct GitHubHost {
    resolver: RepositoryResolver,
    publisher: PullRequestPublisher,
}

impl GitHubHost {
    pub fn new(config: GitHubConfig) -> Result<Self, HostingError> {
        let client = GitHubClient::new(
            config.endpoint,
            &config.user_agent,
            config.request_timeout,
        )?;
        Ok(Self {
            resolver: RepositoryResolver::new(
                client.clone(),
                config.template_repository,
                config.repository_description,
                config.settle,
            ),
            publisher: PullRequestPublisher::new(client),
        })
    }
}

#[async_trait]
impl RepositoryHost for GitHubHost {
    async fn resolve_user(&self, token: &ApiToken) -> Result<RemoteUser, HostingError> {
        self.resolver.resolve_user(token).await
    }

    async fn find_or_create_repository(
        &self,
        token: &ApiToken,
        user: &RemoteUser,
        project: &ProjectName,
    ) -> Result<RepositoryResolution, HostingError> {
        self.resolver
            .find_or_create_repository(token, user, project)
            .await
    }

    async fn create_pull_request(
        &self,
        token: &ApiToken,
        draft: &PullRequestDraft,
    ) -> Result<PullRequestOutcome, HostingError> {
        self.publisher.create_pull_request(token, draft).await
    }
}
