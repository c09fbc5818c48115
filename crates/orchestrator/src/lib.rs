//! Publish orchestration for deck documents.
//!
//! [`PublishOrchestrator::handle`] takes one [`pipeline::DocumentChange`] and
//! walks it through every [`pipeline::PublishStage`]: precondition checks,
//! credential lookup, user and repository resolution, clone, branch, pull,
//! materialise, commit, push and pull request. Each run gets a fresh
//! [`pipeline::RunContext`] with a private working directory that is removed
//! whatever the outcome.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** This crate sequences calls to the port traits in
//! [`pipeline`]; it holds no I/O of its own and no hosting or git details.
//! Adapters are injected through [`PublishPorts`].

mod publish;
mod reporter;
pub mod settings;

pub use publish::{PublishOrchestrator, PublishPorts};
pub use reporter::TracingFailureReporter;
pub use settings::{
    PublishSettings, DEFAULT_BRANCH, DEFAULT_COMMIT_MESSAGE, DEFAULT_ENTRY_FILE,
    DEFAULT_FALLBACK_BASE, DEFAULT_PROJECT, DEFAULT_PULL_REQUEST_BODY, DEFAULT_PULL_REQUEST_TITLE,
};
