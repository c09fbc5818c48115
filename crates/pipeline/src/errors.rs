//! Top-level error and retry-policy types for the publish domain.
//!
//! [`PublishError`] is what the orchestrator sees once a run is under way.
//! Component-level errors ([`crate::hosting::HostingError`],
//! [`crate::working_copy::WorkingCopyError`], [`crate::credentials::CredentialError`])
//! are defined in their respective modules and convert into it.
//!
//! [`RetryPolicy`] is a cross-cutting concern: every error can say whether the
//! same publish is worth attempting again. The pipeline itself never retries;
//! the policy is recorded on failure records for whatever tooling consumes them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CredentialError, HostingError, WorkingCopyError};

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means the caller
        /// applies its own schedule.
        after: Option<Duration>,
    },
    /// Retrying without outside intervention will fail the same way.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Publish-level errors
// ---------------------------------------------------------------------------

/// Errors that abort one publish run.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Hosting(#[from] HostingError),

    #[error(transparent)]
    WorkingCopy(#[from] WorkingCopyError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Settings are invalid. Produced at construction time; a run never starts
    /// with invalid settings.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl PublishError {
    /// Stable machine-readable category, used in failure records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hosting(HostingError::Transport { .. }) => "hosting_transport",
            Self::Hosting(HostingError::Status { .. }) => "hosting_status",
            Self::Hosting(HostingError::Decode { .. }) => "hosting_decode",
            Self::Hosting(HostingError::UserResolution { .. }) => "user_resolution",
            Self::Hosting(HostingError::ProvisioningTimeout { .. }) => "provisioning_timeout",
            Self::WorkingCopy(WorkingCopyError::Io { .. }) => "io",
            Self::WorkingCopy(WorkingCopyError::Spawn { .. }) => "git_spawn",
            Self::WorkingCopy(WorkingCopyError::CommandFailed { .. }) => "git_command",
            Self::WorkingCopy(WorkingCopyError::PushFailed { .. }) => "push",
            Self::Credential(_) => "credential_store",
            Self::Configuration { .. } => "configuration",
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Hosting(e) => e.retry_policy(),
            Self::WorkingCopy(e) => e.retry_policy(),
            Self::Credential(CredentialError::Unavailable { .. }) => {
                RetryPolicy::Retryable { after: None }
            }
            Self::Credential(CredentialError::Malformed { .. }) | Self::Configuration { .. } => {
                RetryPolicy::NonRetryable
            }
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
