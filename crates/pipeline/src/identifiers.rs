//! Newtype domain identifiers.
//!
//! Every concept with an identity gets its own newtype so that, for example, a
//! [`UserNodeId`] can never be passed where a [`RepositoryNodeId`] is expected
//! even though both are opaque GraphQL node ids under the hood.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Returned when a blank value is offered as an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} must not be blank")]
pub struct BlankIdentifier(&'static str);

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, from_static(), as_str(), Display,
// and a TryFrom<String> that serde goes through so blank values never deserialize.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty
            /// or only whitespace.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Creates an identifier from a compile-time constant. The
            /// literal must not be blank.
            pub fn from_static(value: &'static str) -> Self {
                debug_assert!(!value.trim().is_empty(), "blank identifier literal");
                Self(value.to_string())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = BlankIdentifier;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or(BlankIdentifier(stringify!($name)))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: document side
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies the owner of a document.
    ///
    /// This is the key under which the owner's hosting credential is stored.
    OwnerId
}

string_id! {
    /// Identifies the document record whose state transition triggered a publish.
    DocumentId
}

// ---------------------------------------------------------------------------
// Identifiers: hosting side
// ---------------------------------------------------------------------------

string_id! {
    /// The hosting user's handle (e.g. `"octocat"`).
    UserLogin
}

string_id! {
    /// Opaque GraphQL node id of a hosting user.
    UserNodeId
}

string_id! {
    /// Opaque GraphQL node id of a repository (target or template).
    RepositoryNodeId
}

string_id! {
    /// Name of the repository created under the user's namespace.
    ProjectName
}

string_id! {
    /// A Git branch name (e.g. `"main"`, `"deckdeckgo"`).
    BranchName
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single publish run (one orchestrator invocation).
///
/// Generated fresh for every triggering change; propagated through spans and
/// failure records so all activity from one run can be correlated. Also used
/// to give each run a private working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublishRunId(Uuid);

impl PublishRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`PublishRunId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for PublishRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
