//! `deckgo-publish` entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration** from flags and environment ([`args::Cli`]).
//! 2. **Wire observability**: `tracing-subscriber` with a pretty or JSON
//!    layer, plus an OpenTelemetry OTLP exporter when an endpoint is set.
//! 3. **Construct infrastructure**: the GitHub host, the git working copy,
//!    the file materialiser, the file credential store and a failure
//!    reporter, injected into a [`PublishOrchestrator`].
//! 4. **Process changes**: every document change read from the input runs as
//!    its own task; one JSON outcome line per change is printed to stdout.

mod args;
mod credentials;
mod events;
mod failures;
mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use github::GitHubHost;
use orchestrator::{PublishOrchestrator, PublishPorts, TracingFailureReporter};
use pipeline::{FailureReporter, PublishedAtGate};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};
use working_copy::{FileMaterializer, GitWorkingCopy};

use crate::args::Cli;
use crate::credentials::FileCredentialStore;
use crate::failures::JsonLinesFailureReporter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let telemetry = telemetry::init(cli.log_format, cli.otlp_endpoint.as_deref())?;

    let result = run(&cli).await;
    if let Err(e) = &result {
        error!(error = %format_args!("{e:#}"), "Publisher stopped");
    }

    telemetry.shutdown();
    result
}

async fn run(cli: &Cli) -> Result<()> {
    let orchestrator = build_orchestrator(cli)?;
    let changes = events::read_changes(&cli.events).await?;
    info!(changes = changes.len(), "Processing document changes");

    let limit = Arc::new(Semaphore::new(cli.max_concurrent.max(1)));
    let mut tasks = JoinSet::new();
    for change in changes {
        let orchestrator = orchestrator.clone();
        let limit = Arc::clone(&limit);
        tasks.spawn(async move {
            let _permit = limit
                .acquire_owned()
                .await
                .context("publish limiter closed")?;
            let outcome = orchestrator.handle(&change).await;
            anyhow::Ok(events::outcome_line(&change.document_id, &outcome))
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(line)) => println!("{line}"),
            Ok(Err(e)) => error!(error = %format_args!("{e:#}"), "Publish task aborted"),
            Err(e) => error!(error = %e, "Publish task panicked"),
        }
    }
    Ok(())
}

fn build_orchestrator(cli: &Cli) -> Result<PublishOrchestrator> {
    let settings = cli.publish_settings()?;
    let host = GitHubHost::new(cli.github_config()?).context("cannot create the GitHub client")?;

    let reporter: Arc<dyn FailureReporter> = match &cli.failure_log {
        Some(path) => Arc::new(JsonLinesFailureReporter::new(path)),
        None => Arc::new(TracingFailureReporter),
    };

    let ports = PublishPorts {
        host: Arc::new(host),
        working_copy: Arc::new(GitWorkingCopy::new(cli.push_endpoint()?)),
        materializer: Arc::new(FileMaterializer),
        credentials: Arc::new(FileCredentialStore::new(&cli.credentials)),
        gate: Arc::new(PublishedAtGate),
        reporter,
    };

    PublishOrchestrator::new(settings, ports).context("invalid publish settings")
}
