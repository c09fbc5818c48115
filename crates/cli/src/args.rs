//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use github::{GitHubConfig, SettlePolicy, DEFAULT_ENDPOINT, DEFAULT_TEMPLATE_REPOSITORY};
use orchestrator::{
    PublishSettings, DEFAULT_BRANCH, DEFAULT_COMMIT_MESSAGE, DEFAULT_ENTRY_FILE,
    DEFAULT_FALLBACK_BASE, DEFAULT_PROJECT, DEFAULT_PULL_REQUEST_BODY, DEFAULT_PULL_REQUEST_TITLE,
};
use pipeline::{BranchName, CommitIdentity, ProjectName, RepositoryNodeId};
use working_copy::{PushEndpoint, DEFAULT_PUSH_BASE};

/// Publishes DeckDeckGo presentations to their authors' GitHub repositories.
#[derive(Parser, Debug, Clone)]
#[command(name = "deckgo-publish", version, about, long_about = None)]
pub struct Cli {
    /// Document changes to process: one JSON change, or one change per line.
    /// Use `-` to read from stdin.
    #[arg(value_name = "EVENTS", default_value = "-", value_hint = clap::ValueHint::FilePath)]
    pub events: PathBuf,

    /// Name recorded as author and committer of publish commits
    #[arg(long, env = "DECKGO_GITHUB_NAME")]
    pub author_name: String,

    /// Email recorded as author and committer of publish commits
    #[arg(long, env = "DECKGO_GITHUB_EMAIL")]
    pub author_email: String,

    /// JSON file mapping owner ids to their GitHub tokens
    #[arg(long, env = "DECKGO_CREDENTIALS_FILE", value_hint = clap::ValueHint::FilePath)]
    pub credentials: PathBuf,

    /// Append failure records to this file as JSON lines (default: log only)
    #[arg(long, env = "DECKGO_FAILURE_LOG", value_hint = clap::ValueHint::FilePath)]
    pub failure_log: Option<PathBuf>,

    /// Repository created under each user's account
    #[arg(long, default_value = DEFAULT_PROJECT)]
    pub project: String,

    /// Rolling branch every publish commits to
    #[arg(long, default_value = DEFAULT_BRANCH)]
    pub branch: String,

    /// Pull request base when the repository has no default branch
    #[arg(long, default_value = DEFAULT_FALLBACK_BASE)]
    pub fallback_base: String,

    /// Template file, relative to the repository root, that receives the deck metadata
    #[arg(long, default_value = DEFAULT_ENTRY_FILE)]
    pub entry_file: PathBuf,

    #[arg(long, default_value = DEFAULT_COMMIT_MESSAGE)]
    pub commit_message: String,

    #[arg(long, default_value = DEFAULT_PULL_REQUEST_TITLE)]
    pub pr_title: String,

    #[arg(long, default_value = DEFAULT_PULL_REQUEST_BODY)]
    pub pr_body: String,

    /// GraphQL node id of the template repository
    #[arg(long, env = "DECKGO_TEMPLATE_REPOSITORY", default_value = DEFAULT_TEMPLATE_REPOSITORY)]
    pub template_repository: String,

    /// GraphQL API endpoint
    #[arg(long, env = "DECKGO_GITHUB_API", default_value = DEFAULT_ENDPOINT)]
    pub api_endpoint: String,

    /// Base URL that user repositories are pushed to
    #[arg(long, env = "DECKGO_GIT_HOST", default_value = DEFAULT_PUSH_BASE)]
    pub git_host: String,

    /// Directory that holds the per-run working copies (default: system temp dir)
    #[arg(long, env = "DECKGO_SCRATCH_ROOT", value_hint = clap::ValueHint::DirPath)]
    pub scratch_root: Option<PathBuf>,

    /// Per-request timeout for the GraphQL API, in seconds
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// How long a repository created from the template may take to become usable, in seconds
    #[arg(long, default_value_t = 30)]
    pub settle_timeout_secs: u64,

    /// First wait before checking a new repository, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub settle_initial_delay_ms: u64,

    /// Longest wait between two readiness checks, in milliseconds
    #[arg(long, default_value_t = 4000)]
    pub settle_max_delay_ms: u64,

    /// Number of changes published at the same time
    #[arg(long, default_value_t = 4)]
    pub max_concurrent: usize,

    /// Log output format
    #[arg(long, env = "DECKGO_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; traces are exported when set
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Cli {
    pub fn publish_settings(&self) -> Result<PublishSettings> {
        let scratch_root = self
            .scratch_root
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("deckgo-publish"));

        let mut settings = PublishSettings::new(
            CommitIdentity {
                name: self.author_name.clone(),
                email: self.author_email.clone(),
            },
            scratch_root,
        );
        settings.project = ProjectName::new(self.project.as_str())
            .context("--project must not be blank")?;
        settings.branch =
            BranchName::new(self.branch.as_str()).context("--branch must not be blank")?;
        settings.fallback_base = BranchName::new(self.fallback_base.as_str())
            .context("--fallback-base must not be blank")?;
        settings.entry_file = self.entry_file.clone();
        settings.commit_message = self.commit_message.clone();
        settings.pull_request_title = self.pr_title.clone();
        settings.pull_request_body = self.pr_body.clone();
        Ok(settings)
    }

    pub fn github_config(&self) -> Result<GitHubConfig> {
        let template = RepositoryNodeId::new(self.template_repository.as_str())
            .context("--template-repository must not be blank")?;
        if self.settle_initial_delay_ms == 0 || self.settle_max_delay_ms < self.settle_initial_delay_ms
        {
            bail!("settle delays must be positive and the maximum must not be below the initial delay");
        }

        let mut config = GitHubConfig::new(template);
        config.endpoint = self.api_endpoint.clone();
        config.request_timeout = Duration::from_secs(self.request_timeout_secs);
        config.settle = SettlePolicy {
            initial_delay: Duration::from_millis(self.settle_initial_delay_ms),
            max_delay: Duration::from_millis(self.settle_max_delay_ms),
            deadline: Duration::from_secs(self.settle_timeout_secs),
        };
        Ok(config)
    }

    pub fn push_endpoint(&self) -> Result<PushEndpoint> {
        PushEndpoint::parse(&self.git_host)
            .with_context(|| format!("--git-host '{}' is not a usable base URL", self.git_host))
    }
}
