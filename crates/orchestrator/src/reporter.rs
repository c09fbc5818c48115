//! Failure reporter that only logs.

use async_trait::async_trait;
use pipeline::{FailureReporter, PublishFailureRecord};
use tracing::error;

/// Emits each failure record as one structured `error` event.
///
/// Used when no durable failure log is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFailureReporter;

#[async_trait]
impl FailureReporter for TracingFailureReporter {
    async fn report(&self, record: &PublishFailureRecord) {
        error!(
            run_id = %record.run_id,
            owner = %record.owner,
            document = %record.document,
            stage = %record.stage,
            kind = %record.kind,
            retry_policy = ?record.retry_policy,
            occurred_at = %record.occurred_at,
            message = %record.message,
            "Publish failure recorded"
        );
    }
}
