//! Durable failure log: one JSON object per line.

use std::path::PathBuf;

use async_trait::async_trait;
use pipeline::{FailureReporter, PublishFailureRecord};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{error, warn};

/// Appends every failure record to a file and logs it.
///
/// Writes are serialised so lines from concurrent runs never interleave.
#[derive(Debug)]
pub struct JsonLinesFailureReporter {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesFailureReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn append(&self, line: &[u8]) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line).await?;
        file.flush().await
    }
}

#[async_trait]
impl FailureReporter for JsonLinesFailureReporter {
    async fn report(&self, record: &PublishFailureRecord) {
        error!(
            run_id = %record.run_id,
            stage = %record.stage,
            kind = %record.kind,
            "Recording publish failure"
        );

        let mut line = match serde_json::to_vec(record) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failure record could not be serialised");
                return;
            }
        };
        line.push(b'\n');

        if let Err(e) = self.append(&line).await {
            warn!(path = %self.path.display(), error = %e, "Failure record could not be written");
        }
    }
}
