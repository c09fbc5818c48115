//! GraphQL documents and the response shapes they produce.
//!
//! Every field is optional on the way in: the API returns `null` for objects
//! it cannot resolve, and a missing field must become a soft failure rather
//! than a decode error.

use pipeline::{
    BranchName, PullRequest, RemoteRepository, RemoteUser, RepositoryNodeId, UserLogin, UserNodeId,
};
use serde::Deserialize;

pub(crate) const VIEWER: &str = r#"
query Viewer {
  viewer {
    id
    login
  }
}
"#;

pub(crate) const FIND_REPOSITORY: &str = r#"
query FindRepository($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    id
    url
    nameWithOwner
    defaultBranchRef {
      name
    }
  }
}
"#;

pub(crate) const CLONE_TEMPLATE_REPOSITORY: &str = r#"
mutation CloneTemplateRepository($input: CloneTemplateRepositoryInput!) {
  cloneTemplateRepository(input: $input) {
    clientMutationId
    repository {
      id
      url
      nameWithOwner
      defaultBranchRef {
        name
      }
    }
  }
}
"#;

pub(crate) const CREATE_PULL_REQUEST: &str = r#"
mutation CreatePullRequest($input: CreatePullRequestInput!) {
  createPullRequest(input: $input) {
    pullRequest {
      id
      number
      url
    }
  }
}
"#;

// ---------------------------------------------------------------------------
// Viewer
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ViewerData {
    pub viewer: Option<ViewerNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ViewerNode {
    pub id: Option<String>,
    pub login: Option<String>,
}

impl ViewerNode {
    pub fn into_user(self) -> Option<RemoteUser> {
        Some(RemoteUser {
            id: UserNodeId::new(self.id?)?,
            login: UserLogin::new(self.login?)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryData {
    pub repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RepositoryNode {
    pub id: Option<String>,
    pub url: Option<String>,
    pub name_with_owner: Option<String>,
    pub default_branch_ref: Option<BranchRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BranchRef {
    pub name: String,
}

impl RepositoryNode {
    /// Converts to the domain type; `None` when the id is missing.
    ///
    /// An empty URL is kept as-is so the orchestrator can report it.
    pub fn into_repository(self) -> Option<RemoteRepository> {
        Some(RemoteRepository {
            id: RepositoryNodeId::new(self.id?)?,
            url: self.url.unwrap_or_default(),
            full_name: self.name_with_owner.unwrap_or_default(),
            default_branch: self.default_branch_ref.and_then(|b| BranchName::new(b.name)),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CloneTemplateData {
    pub clone_template_repository: Option<CloneTemplatePayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CloneTemplatePayload {
    pub repository: Option<RepositoryNode>,
}

// ---------------------------------------------------------------------------
// Pull requests
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePullRequestData {
    pub create_pull_request: Option<CreatePullRequestPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePullRequestPayload {
    pub pull_request: Option<PullRequestNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestNode {
    pub id: String,
    pub number: u64,
    pub url: String,
}

impl From<PullRequestNode> for PullRequest {
    fn from(node: PullRequestNode) -> Self {
        Self {
            id: node.id,
            number: node.number,
            url: node.url,
        }
    }
}
