//! Trigger input: a before/after snapshot pair of a document record.
//!
//! Many changes legitimately do not qualify for publishing (drafts, edits to
//! unpublished documents, re-saves of an already published one). The checks
//! here separate those from real publish requests without touching the
//! network or the filesystem.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DocumentId, OwnerId, SkipReason, Substitutions};

/// A state transition of one document record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChange {
    pub document_id: DocumentId,
    #[serde(default)]
    pub before: Option<DeckSnapshot>,
    #[serde(default)]
    pub after: Option<DeckSnapshot>,
}

/// One snapshot of a deck document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckSnapshot {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub meta: Option<DeckMeta>,
}

/// Publication metadata of a deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub pathname: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<DeckAuthor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

/// A change that passed the field-level preconditions.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishCandidate<'a> {
    pub owner: OwnerId,
    pub document: DocumentId,
    pub before: Option<&'a DeckSnapshot>,
    pub after: &'a DeckSnapshot,
}

impl DocumentChange {
    /// Checks the fields the `after` snapshot must carry to be publishable:
    /// the published flag, a non-empty pathname and a non-empty owner id.
    pub fn candidate(&self) -> Result<PublishCandidate<'_>, SkipReason> {
        let after = self.after.as_ref().ok_or(SkipReason::DocumentDeleted)?;
        let meta = after.meta.as_ref().ok_or(SkipReason::NotPublished)?;
        if !meta.published {
            return Err(SkipReason::NotPublished);
        }
        if meta
            .pathname
            .as_deref()
            .map_or(true, |p| p.trim().is_empty())
        {
            return Err(SkipReason::MissingPathname);
        }
        let owner = after
            .owner_id
            .clone()
            .and_then(OwnerId::new)
            .ok_or(SkipReason::MissingOwner)?;

        Ok(PublishCandidate {
            owner,
            document: self.document_id.clone(),
            before: self.before.as_ref(),
            after,
        })
    }
}

impl DeckSnapshot {
    /// Title used for the title placeholder: the meta title, else the deck name.
    pub fn title(&self) -> &str {
        self.meta
            .as_ref()
            .and_then(|m| m.title.as_deref())
            .filter(|t| !t.trim().is_empty())
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    pub fn author_name(&self) -> &str {
        self.meta
            .as_ref()
            .and_then(|m| m.author.as_ref())
            .and_then(|a| a.name.as_deref())
            .unwrap_or_default()
    }

    /// Substitutions materialised into the template's entry file.
    pub fn substitutions(&self) -> Substitutions {
        Substitutions::for_deck(self.title(), self.author_name())
    }

    fn published_at(&self) -> Option<DateTime<Utc>> {
        self.meta
            .as_ref()
            .filter(|m| m.published)
            .and_then(|m| m.published_at)
    }
}

/// Decides whether a transition newly requires publishing.
#[async_trait]
pub trait PublishGate: Send + Sync {
    async fn requires_publish(&self, before: Option<&DeckSnapshot>, after: &DeckSnapshot) -> bool;
}

/// Gate that fires when the document became published, or was published
/// again (a different `published_at`).
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishedAtGate;

#[async_trait]
impl PublishGate for PublishedAtGate {
    async fn requires_publish(&self, before: Option<&DeckSnapshot>, after: &DeckSnapshot) -> bool {
        let Some(now) = after.published_at() else {
            // Published without a timestamp: only a fresh publication counts.
            return before.and_then(|b| b.meta.as_ref()).map_or(true, |m| !m.published);
        };
        match before.and_then(DeckSnapshot::published_at) {
            Some(previous) => previous != now,
            None => true,
        }
    }
}
