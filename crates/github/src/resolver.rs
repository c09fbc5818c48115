//! User resolution and repository find-or-provision.
//!
//! A repository cloned from a template is created asynchronously by the
//! hosting backend: the mutation returns before the copy is usable. Instead
//! of sleeping a fixed time, [`RepositoryResolver`] polls the repository with
//! exponential backoff until it reports a default branch, and gives up with
//! [`HostingError::ProvisioningTimeout`] once [`SettlePolicy::deadline`] has
//! passed.

use std::time::Duration;

use pipeline::{
    ApiToken, HostingError, ProjectName, RemoteRepository, RemoteUser, RepositoryNodeId,
    RepositoryResolution, SoftFailure,
};
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::client::GitHubClient;
use crate::queries::{
    CloneTemplateData, RepositoryData, ViewerData, CLONE_TEMPLATE_REPOSITORY, FIND_REPOSITORY,
    VIEWER,
};

/// Template repository every new user repository is cloned from.
pub const DEFAULT_TEMPLATE_REPOSITORY: &str = "MDEwOlJlcG9zaXRvcnkxNTM0MDk2MTg=";

/// Backoff schedule used while waiting for a new repository to settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    /// Wait before the first readiness check.
    pub initial_delay: Duration,
    /// Cap on the wait between two checks.
    pub max_delay: Duration,
    /// Total time after which provisioning counts as failed.
    pub deadline: Duration,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(4),
            deadline: Duration::from_secs(30),
        }
    }
}

/// Result of a single repository lookup.
#[derive(Debug)]
enum Lookup {
    Found(RemoteRepository),
    Missing,
    Rejected(SoftFailure),
}

/// Finds the user's target repository, provisioning it when absent.
#[derive(Debug, Clone)]
pub struct RepositoryResolver {
    client: GitHubClient,
    template: RepositoryNodeId,
    description: String,
    settle: SettlePolicy,
}

impl RepositoryResolver {
    pub fn new(
        client: GitHubClient,
        template: RepositoryNodeId,
        description: impl Into<String>,
        settle: SettlePolicy,
    ) -> Self {
        Self {
            client,
            template,
            description: description.into(),
            settle,
        }
    }

    /// Resolves the user behind `token`.
    #[instrument(skip_all)]
    pub async fn resolve_user(&self, token: &ApiToken) -> Result<RemoteUser, HostingError> {
        let response = self
            .client
            .query::<ViewerData>(token, VIEWER, json!({}))
            .await?;
        let errors = response.error_messages();
        response
            .data
            .and_then(|d| d.viewer)
            .and_then(|v| v.into_user())
            .ok_or_else(|| HostingError::UserResolution {
                reason: if errors.is_empty() {
                    "viewer id or login missing from response".to_string()
                } else {
                    errors.join("; ")
                },
            })
    }

    /// Returns `<user.login>/<project>`, creating it from the template when
    /// it does not exist yet.
    #[instrument(skip_all, fields(owner = %user.login, project = %project))]
    pub async fn find_or_create_repository(
        &self,
        token: &ApiToken,
        user: &RemoteUser,
        project: &ProjectName,
    ) -> Result<RepositoryResolution, HostingError> {
        match self.lookup(token, user, project).await? {
            Lookup::Found(repo) => {
                debug!(repository = %repo.full_name, "Repository already exists");
                return Ok(RepositoryResolution::Existing(repo));
            }
            Lookup::Rejected(failure) => {
                warn!(%failure, "Repository lookup rejected");
                return Ok(RepositoryResolution::Unavailable(failure));
            }
            Lookup::Missing => {}
        }

        if let Err(failure) = self.create(token, user, project).await? {
            warn!(%failure, "Repository could not be created from template");
            return Ok(RepositoryResolution::Unavailable(failure));
        }

        let repo = self.wait_until_ready(token, user, project).await?;
        info!(repository = %repo.full_name, "Repository created from template");
        Ok(RepositoryResolution::Created(repo))
    }

    async fn lookup(
        &self,
        token: &ApiToken,
        user: &RemoteUser,
        project: &ProjectName,
    ) -> Result<Lookup, HostingError> {
        let response = self
            .client
            .query::<RepositoryData>(
                token,
                FIND_REPOSITORY,
                json!({ "owner": user.login.as_str(), "name": project.as_str() }),
            )
            .await?;

        let only_not_found = response.errors.iter().all(|e| e.is_not_found());
        let messages = response.error_messages();
        match response.data.and_then(|d| d.repository) {
            Some(node) => match node.into_repository() {
                Some(repo) => Ok(Lookup::Found(repo)),
                None => Ok(Lookup::Rejected(SoftFailure::new(
                    "repository returned without an id",
                    messages,
                ))),
            },
            None if only_not_found => Ok(Lookup::Missing),
            None => Ok(Lookup::Rejected(SoftFailure::new(
                "repository lookup returned errors",
                messages,
            ))),
        }
    }

    /// Issues the clone-from-template mutation.
    ///
    /// The outer `Result` carries transport failures; the inner one carries
    /// a soft failure when the API answered without a repository.
    async fn create(
        &self,
        token: &ApiToken,
        user: &RemoteUser,
        project: &ProjectName,
    ) -> Result<Result<(), SoftFailure>, HostingError> {
        let input = json!({
            "input": {
                "repositoryId": self.template.as_str(),
                "ownerId": user.id.as_str(),
                "name": project.as_str(),
                "description": self.description,
                "visibility": "PUBLIC",
                "includeAllBranches": false,
            }
        });
        let response = self
            .client
            .query::<CloneTemplateData>(token, CLONE_TEMPLATE_REPOSITORY, input)
            .await?;

        if response.has_errors() {
            return Ok(Err(SoftFailure::new(
                "template clone rejected",
                response.error_messages(),
            )));
        }
        let created = response
            .data
            .and_then(|d| d.clone_template_repository)
            .and_then(|p| p.repository)
            .is_some();
        if created {
            Ok(Ok(()))
        } else {
            Ok(Err(SoftFailure::new(
                "template clone returned no repository",
                Vec::new(),
            )))
        }
    }

    /// Polls until the new repository is visible with a default branch.
    async fn wait_until_ready(
        &self,
        token: &ApiToken,
        user: &RemoteUser,
        project: &ProjectName,
    ) -> Result<RemoteRepository, HostingError> {
        let started = Instant::now();
        let mut delay = self.settle.initial_delay;
        let mut attempt = 0u32;

        loop {
            let remaining = self.settle.deadline.saturating_sub(started.elapsed());
            tokio::time::sleep(delay.min(remaining)).await;
            attempt += 1;

            match self.lookup(token, user, project).await? {
                Lookup::Found(repo) if repo.default_branch.is_some() => return Ok(repo),
                Lookup::Found(_) => debug!(attempt, "Repository visible but not populated yet"),
                Lookup::Missing => debug!(attempt, "Repository not visible yet"),
                Lookup::Rejected(failure) => debug!(attempt, %failure, "Readiness check rejected"),
            }

            if started.elapsed() >= self.settle.deadline {
                return Err(HostingError::ProvisioningTimeout {
                    owner: user.login.clone(),
                    project: project.clone(),
                    waited: started.elapsed(),
                });
            }
            delay = (delay * 2).min(self.settle.max_delay);
        }
    }
}
