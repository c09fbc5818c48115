//! Core domain for the deck publishing pipeline.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, port trait, and cross-cutting error type used by the publisher.
//! Infrastructure crates implement the traits defined here; they never add
//! domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`OwnerId`, `BranchName`, `PublishRunId`, etc.) |
//! | [`types`] | Value types (`RemoteRepository`, `Substitutions`, `RunContext`, tagged outcomes) |
//! | [`trigger`] | Document change input and the publish gate |
//! | [`credentials`] | `ApiToken`, `CredentialStore` port |
//! | [`hosting`] | `RepositoryHost` port and `HostingError` |
//! | [`working_copy`] | `WorkingCopy` / `ContentMaterializer` ports and `WorkingCopyError` |
//! | [`outcome`] | Stages, outcomes, failure records, `FailureReporter` port |
//! | [`errors`] | `PublishError` and `RetryPolicy` |

pub mod credentials;
pub mod errors;
pub mod hosting;
pub mod identifiers;
pub mod outcome;
pub mod trigger;
pub mod types;
pub mod working_copy;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use credentials::{ApiToken, Credential, CredentialError, CredentialStore, REDACTED};
pub use errors::{PublishError, RetryPolicy};
pub use hosting::{HostingError, RepositoryHost};
pub use identifiers::{
    BlankIdentifier, BranchName, DocumentId, OwnerId, ProjectName, PublishRunId, RepositoryNodeId,
    UserLogin, UserNodeId,
};
pub use outcome::{
    FailureReporter, PublishFailureRecord, PublishOutcome, PublishStage, SkipReason,
};
pub use trigger::{
    DeckAuthor, DeckMeta, DeckSnapshot, DocumentChange, PublishCandidate, PublishGate,
    PublishedAtGate,
};
pub use types::{
    CommitIdentity, CommitOutcome, PullOutcome, PullRequest, PullRequestDraft,
    PullRequestOutcome, RemoteRepository, RemoteUser, RepositoryResolution, RunContext,
    SoftFailure, Substitutions, Timestamp,
};
pub use working_copy::{ContentMaterializer, PushRequest, WorkingCopy, WorkingCopyError};
