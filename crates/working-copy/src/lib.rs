//! Local working-copy infrastructure for the deck publisher.
//!
//! Implements [`pipeline::WorkingCopy`] with the `git` command line and
//! [`pipeline::ContentMaterializer`] with plain file rewrites.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Process spawning, filesystem access, credentialed
//! remote URLs and output parsing live here. The orchestrator only sees the
//! port traits and names the working directory on every call; nothing in
//! this crate assumes a fixed path.
//!
//! ## Credentials
//!
//! Only [`pipeline::WorkingCopy::push`] ever sees the user's token. It builds
//! the credentialed URL through [`PushEndpoint`], hands it straight to git,
//! and replaces any failure with [`pipeline::WorkingCopyError::PushFailed`],
//! which names the login, project and branch and nothing else.

pub mod git;
pub mod materialize;
pub mod remote;
pub mod runner;

pub use git::GitWorkingCopy;
pub use materialize::{substitute, FileMaterializer};
pub use remote::{PushEndpoint, DEFAULT_PUSH_BASE};
pub use runner::{GitOutput, GitRunner, SystemGit};
