//! GraphQL transport.
//!
//! [`GitHubClient::query`] fails only when the HTTP exchange fails. It never
//! interprets the GraphQL `errors` array: that is handed back in the
//! [`GraphQlResponse`] envelope for the caller to judge.

use std::time::Duration;

use pipeline::{ApiToken, HostingError};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Public GraphQL endpoint of the hosting API.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

/// Sent on every request; the API rejects requests without a user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("deckgo-publish/", env!("CARGO_PKG_VERSION"));

/// Upper bound on how much of an error body is kept in [`HostingError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    /// Error classification, e.g. `NOT_FOUND` or `FORBIDDEN`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl GraphQlError {
    pub fn is_not_found(&self) -> bool {
        self.kind.as_deref() == Some("NOT_FOUND")
    }
}

/// The GraphQL response envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct GraphQlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

impl<T> GraphQlResponse<T> {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Error messages, for inclusion in a soft failure.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }
}

#[derive(Serialize)]
struct RequestBody<'a> {
    query: &'a str,
    variables: &'a serde_json::Value,
}

/// Authenticated GraphQL client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GitHubClient {
    /// Creates a client for `endpoint`.
    ///
    /// `request_timeout` bounds each call so that a hung request cannot stall
    /// a publish indefinitely.
    pub fn new(
        endpoint: impl Into<String>,
        user_agent: &str,
        request_timeout: Duration,
    ) -> Result<Self, HostingError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(request_timeout)
            .build()
            .map_err(|e| HostingError::Transport {
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Executes `document` with `variables` on behalf of the token's owner.
    #[instrument(skip_all, fields(operation = operation_name(document)))]
    pub async fn query<T: DeserializeOwned>(
        &self,
        token: &ApiToken,
        document: &str,
        variables: serde_json::Value,
    ) -> Result<GraphQlResponse<T>, HostingError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token.expose())
            .header(ACCEPT, "application/json")
            .json(&RequestBody {
                query: document,
                variables: &variables,
            })
            .send()
            .await
            .map_err(|e| HostingError::Transport {
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HostingError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| HostingError::Transport {
            message: e.without_url().to_string(),
        })?;
        let envelope: GraphQlResponse<T> =
            serde_json::from_slice(&bytes).map_err(|e| HostingError::Decode {
                message: e.to_string(),
            })?;

        debug!(
            has_data = envelope.data.is_some(),
            error_count = envelope.errors.len(),
            "GraphQL call completed"
        );
        Ok(envelope)
    }
}

/// Extracts the operation name (`query Foo` / `mutation Foo`) for span fields.
fn operation_name(document: &str) -> &str {
    document
        .split_whitespace()
        .skip_while(|w| *w != "query" && *w != "mutation")
        .nth(1)
        .map(|name| name.split(['(', '{']).next().unwrap_or(name))
        .unwrap_or("anonymous")
}
