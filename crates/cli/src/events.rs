//! Reading document changes and reporting what became of them.

use std::path::Path;

use anyhow::{Context, Result};
use pipeline::{DocumentChange, DocumentId, PublishOutcome};
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;

/// Reads changes from `source`, or from stdin when it is `-`.
pub async fn read_changes(source: &Path) -> Result<Vec<DocumentChange>> {
    let text = if source == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("cannot read document changes from stdin")?;
        text
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("cannot read document changes from {}", source.display()))?
    };
    parse_changes(&text)
}

/// Accepts a JSON array of changes, a single change, or a stream of changes
/// separated by whitespace (JSON lines).
pub fn parse_changes(text: &str) -> Result<Vec<DocumentChange>> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).context("invalid document change array");
    }
    serde_json::Deserializer::from_str(text)
        .into_iter::<DocumentChange>()
        .enumerate()
        .map(|(index, change)| {
            change.with_context(|| format!("invalid document change #{}", index + 1))
        })
        .collect()
}

/// One line of machine-readable output per processed change.
pub fn outcome_line(document: &DocumentId, outcome: &PublishOutcome) -> Value {
    match outcome {
        PublishOutcome::Published {
            repository,
            pull_request,
        } => json!({
            "document": document,
            "outcome": "published",
            "repository": repository.full_name,
            "pull_request": pull_request.as_ref().map(|pr| pr.url.as_str()),
        }),
        PublishOutcome::Skipped(reason) => json!({
            "document": document,
            "outcome": "skipped",
            "skip": reason,
        }),
        PublishOutcome::Failed(record) => json!({
            "document": document,
            "outcome": "failed",
            "run_id": record.run_id,
            "stage": record.stage,
            "kind": record.kind,
            "message": record.message,
        }),
    }
}
