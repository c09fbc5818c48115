//! The publish run: preconditions, remote resolution, local working copy,
//! push and pull request, in that order.

use std::sync::Arc;

use pipeline::{
    ApiToken, CommitOutcome, ContentMaterializer, CredentialStore, DeckSnapshot,
    DocumentChange, FailureReporter, HostingError, PublishError, PublishFailureRecord,
    PublishGate, PublishOutcome, PublishRunId, PublishStage, PullRequest, PullRequestDraft,
    PullRequestOutcome, PushRequest, RemoteRepository, RemoteUser, RepositoryHost,
    RepositoryResolution, RunContext, SkipReason, WorkingCopy,
};
use tracing::{debug, error, field, info, info_span, warn, Instrument, Span};

use crate::settings::PublishSettings;

/// Adapters the orchestrator drives.
#[derive(Clone)]
pub struct PublishPorts {
    pub host: Arc<dyn RepositoryHost>,
    pub working_copy: Arc<dyn WorkingCopy>,
    pub materializer: Arc<dyn ContentMaterializer>,
    pub credentials: Arc<dyn CredentialStore>,
    pub gate: Arc<dyn PublishGate>,
    pub reporter: Arc<dyn FailureReporter>,
}

/// Drives one publish run per document change.
///
/// Cheap to clone; clones share the same adapters and may run concurrently
/// because every run works in its own directory.
#[derive(Clone)]
pub struct PublishOrchestrator {
    settings: Arc<PublishSettings>,
    ports: PublishPorts,
}

/// Last stage a run has reached.
struct Progress {
    stage: PublishStage,
}

impl Progress {
    fn reach(&mut self, stage: PublishStage) {
        self.stage = stage;
        debug!(%stage, "Stage reached");
    }
}

impl PublishOrchestrator {
    pub fn new(settings: PublishSettings, ports: PublishPorts) -> Result<Self, PublishError> {
        settings.validate()?;
        Ok(Self {
            settings: Arc::new(settings),
            ports,
        })
    }

    /// Runs the publish flow for `change` to completion.
    ///
    /// Never fails: problems end up in [`PublishOutcome::Failed`] after being
    /// handed to the failure reporter.
    pub async fn handle(&self, change: &DocumentChange) -> PublishOutcome {
        let run_id = PublishRunId::new_random();
        let span = info_span!(
            "publish",
            %run_id,
            document = %change.document_id,
            owner = field::Empty,
        );
        self.run(run_id, change).instrument(span).await
    }

    async fn run(&self, run_id: PublishRunId, change: &DocumentChange) -> PublishOutcome {
        let candidate = match change.candidate() {
            Ok(candidate) => candidate,
            Err(reason) => return skipped(reason),
        };
        Span::current().record("owner", field::display(&candidate.owner));

        if !self
            .ports
            .gate
            .requires_publish(candidate.before, candidate.after)
            .await
        {
            return skipped(SkipReason::AlreadyPublished);
        }

        let ctx = RunContext::new(
            run_id,
            candidate.owner,
            candidate.document,
            self.settings.project.clone(),
            self.settings.branch.clone(),
            &self.settings.scratch_root,
        );
        let mut progress = Progress {
            stage: PublishStage::Idle,
        };
        progress.reach(PublishStage::PreconditionsChecked);

        let result = self.publish(&ctx, candidate.after, &mut progress).await;

        // The working copy is created right after the repository resolves.
        if progress.stage >= PublishStage::RepositoryResolved {
            if let Err(e) = self.ports.working_copy.discard(ctx.work_dir()).await {
                warn!(error = %e, "Failed to discard working directory");
            }
        }

        match result {
            Ok(outcome) => {
                match &outcome {
                    PublishOutcome::Published {
                        repository,
                        pull_request,
                    } => info!(
                        repository = %repository.full_name,
                        pull_request = pull_request.as_ref().map(|pr| pr.number),
                        "Deck published"
                    ),
                    PublishOutcome::Skipped(reason) => {
                        info!(?reason, stage = %progress.stage, "Publish skipped")
                    }
                    PublishOutcome::Failed(_) => {}
                }
                outcome
            }
            Err(error) => {
                let record = PublishFailureRecord::new(
                    ctx.run_id,
                    ctx.owner.clone(),
                    ctx.document.clone(),
                    progress.stage,
                    &error,
                );
                error!(
                    stage = %record.stage,
                    kind = %record.kind,
                    error = %record.message,
                    "Publish failed"
                );
                self.ports.reporter.report(&record).await;
                PublishOutcome::Failed(record)
            }
        }
    }

    async fn publish(
        &self,
        ctx: &RunContext,
        deck: &DeckSnapshot,
        progress: &mut Progress,
    ) -> Result<PublishOutcome, PublishError> {
        let token = match self.ports.credentials.find_credential(&ctx.owner).await? {
            None => return Ok(PublishOutcome::Skipped(SkipReason::NoCredential)),
            Some(credential) => match credential.token {
                Some(token) => token,
                None => return Ok(PublishOutcome::Skipped(SkipReason::MalformedCredential)),
            },
        };
        progress.reach(PublishStage::CredentialResolved);

        let user = match self.ports.host.resolve_user(&token).await {
            Ok(user) => user,
            Err(HostingError::UserResolution { reason }) => {
                return Ok(PublishOutcome::Skipped(SkipReason::UserUnresolved {
                    detail: reason,
                }))
            }
            Err(e) => return Err(e.into()),
        };
        progress.reach(PublishStage::UserResolved);

        let repository = match self
            .ports
            .host
            .find_or_create_repository(&token, &user, &ctx.project)
            .await?
        {
            RepositoryResolution::Existing(repository) => {
                debug!(repository = %repository.full_name, "Using existing repository");
                repository
            }
            RepositoryResolution::Created(repository) => {
                info!(repository = %repository.full_name, "Repository created from template");
                repository
            }
            RepositoryResolution::Unavailable(failure) => {
                return Ok(PublishOutcome::Skipped(SkipReason::RepositoryUnavailable {
                    detail: failure.to_string(),
                }))
            }
        };
        if repository.url.trim().is_empty() {
            return Ok(PublishOutcome::Skipped(SkipReason::MissingRepositoryUrl));
        }
        progress.reach(PublishStage::RepositoryResolved);

        // The rolling branch may already hold this content; it is pushed and
        // proposed regardless.
        let committed = self
            .prepare_content(ctx, &repository, deck, progress)
            .await?;
        if committed == CommitOutcome::Unchanged {
            info!(repository = %repository.full_name, "Nothing new to commit");
        }

        self.push(ctx, &token, &user).await?;
        progress.reach(PublishStage::Pushed);

        let pull_request = self.open_pull_request(&token, &repository).await?;
        if pull_request.is_some() {
            progress.reach(PublishStage::PullRequestOpened);
        }
        progress.reach(PublishStage::Done);

        Ok(PublishOutcome::Published {
            repository,
            pull_request,
        })
    }

    /// Clone, branch, pull, materialise and commit in the run's directory.
    async fn prepare_content(
        &self,
        ctx: &RunContext,
        repository: &RemoteRepository,
        deck: &DeckSnapshot,
        progress: &mut Progress,
    ) -> Result<CommitOutcome, PublishError> {
        let wc = &self.ports.working_copy;
        let dir = ctx.work_dir();

        wc.ensure_clean(dir).await?;
        wc.clone_repository(&repository.url, dir).await?;
        progress.reach(PublishStage::Cloned);

        wc.checkout_branch(dir, &ctx.branch).await?;
        progress.reach(PublishStage::BranchReady);

        let pulled = wc
            .pull_if_remote_branch_exists(&repository.url, dir, &ctx.branch, &self.settings.identity)
            .await?;
        debug!(?pulled, "Rolling branch synchronised");
        progress.reach(PublishStage::PulledIfApplicable);

        let replaced = self
            .ports
            .materializer
            .materialize(&dir.join(&self.settings.entry_file), &deck.substitutions())
            .await?;
        if replaced == 0 {
            warn!(
                entry_file = %self.settings.entry_file.display(),
                "No placeholders found in entry file"
            );
        }
        progress.reach(PublishStage::ContentMaterialized);

        let committed = wc
            .commit(
                dir,
                &self.settings.identity,
                std::slice::from_ref(&self.settings.entry_file),
                &self.settings.commit_message,
            )
            .await?;
        if committed == CommitOutcome::Committed {
            progress.reach(PublishStage::Committed);
        }
        Ok(committed)
    }

    async fn push(
        &self,
        ctx: &RunContext,
        token: &ApiToken,
        user: &RemoteUser,
    ) -> Result<(), PublishError> {
        self.ports
            .working_copy
            .push(
                ctx.work_dir(),
                PushRequest {
                    token,
                    identity: &self.settings.identity,
                    login: &user.login,
                    project: &ctx.project,
                    branch: &ctx.branch,
                },
            )
            .await?;
        Ok(())
    }

    /// Opens the pull request. A soft failure is logged and yields `None`.
    async fn open_pull_request(
        &self,
        token: &ApiToken,
        repository: &RemoteRepository,
    ) -> Result<Option<PullRequest>, PublishError> {
        let draft = PullRequestDraft {
            repository: repository.id.clone(),
            head: self.settings.branch.clone(),
            base: repository
                .default_branch
                .clone()
                .unwrap_or_else(|| self.settings.fallback_base.clone()),
            title: self.settings.pull_request_title.clone(),
            body: self.settings.pull_request_body.clone(),
        };

        match self.ports.host.create_pull_request(token, &draft).await? {
            PullRequestOutcome::Opened(pr) => {
                debug!(number = pr.number, url = %pr.url, "Pull request opened");
                Ok(Some(pr))
            }
            PullRequestOutcome::NotOpened(failure) => {
                warn!(%failure, "Pull request was not opened");
                Ok(None)
            }
        }
    }
}

fn skipped(reason: SkipReason) -> PublishOutcome {
    debug!(?reason, "Change does not qualify for publishing");
    PublishOutcome::Skipped(reason)
}
