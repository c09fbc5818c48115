//! Credential store backed by a JSON file.
//!
//! The file maps owner ids to their stored integrations:
//!
//! ```json
//! { "owner-id": { "github": { "token": "gho_..." } } }
//! ```
//!
//! It is re-read on every lookup so rotated tokens are picked up without a
//! restart.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use pipeline::{ApiToken, Credential, CredentialError, CredentialStore, OwnerId};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct StoredCredential {
    #[serde(default)]
    github: Option<GitHubIntegration>,
}

#[derive(Debug, Deserialize)]
struct GitHubIntegration {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn find_credential(
        &self,
        owner: &OwnerId,
    ) -> Result<Option<Credential>, CredentialError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CredentialError::Unavailable {
                message: format!("cannot read {}: {e}", self.path.display()),
            })?;
        let mut records: HashMap<String, serde_json::Value> = serde_json::from_str(&raw)
            .map_err(|e| CredentialError::Unavailable {
                message: format!(
                    "{} is not a credential map (line {}, column {})",
                    self.path.display(),
                    e.line(),
                    e.column()
                ),
            })?;

        let Some(record) = records.remove(owner.as_str()) else {
            debug!(%owner, "No credential record");
            return Ok(None);
        };
        // serde_json type errors quote the offending value, which may be a secret.
        let stored: StoredCredential =
            serde_json::from_value(record).map_err(|_| CredentialError::Malformed {
                owner: owner.clone(),
                message: "expected { \"github\": { \"token\": <string> } }".to_string(),
            })?;

        Ok(Some(Credential {
            token: stored
                .github
                .and_then(|github| github.token)
                .and_then(ApiToken::new),
        }))
    }
}
