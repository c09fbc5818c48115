//! Hosting credentials and the port through which they are looked up.
//!
//! Credentials are owned by an external token store. The publish pipeline
//! only reads them, and it must never let the raw token reach a log line or
//! an error message. [`ApiToken`] therefore redacts itself in both `Debug`
//! and `Display`; the secret is reachable only through [`ApiToken::expose`].

use async_trait::async_trait;
use thiserror::Error;

use crate::OwnerId;

/// Text substituted wherever a secret would otherwise be printed.
pub const REDACTED: &str = "[REDACTED]";

/// Opaque per-user token scoped to the hosting API.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wraps a raw token, returning `None` when it is empty or blank.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Returns the raw secret. Callers must not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiToken").field(&REDACTED).finish()
    }
}

impl std::fmt::Display for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(REDACTED)
    }
}

/// A per-user credential record as stored by the token store.
///
/// The token is optional because records may exist for owners who never
/// connected a hosting account; such records count as "no credential".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: Option<ApiToken>,
}

/// Failure of the credential store itself (not absence of a credential).
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Credential store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Credential record for owner '{owner}' is malformed: {message}")]
    Malformed { owner: OwnerId, message: String },
}

/// Lookup of hosting credentials keyed by document owner.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the owner's credential record, or `None` if there is none.
    async fn find_credential(&self, owner: &OwnerId)
        -> Result<Option<Credential>, CredentialError>;
}
