//! Publish runs driven end to end against in-memory adapters.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use orchestrator::{PublishOrchestrator, PublishPorts, PublishSettings};
use pipeline::{
    ApiToken, BranchName, CommitIdentity, CommitOutcome, ContentMaterializer, Credential,
    CredentialError, CredentialStore, DeckAuthor, DeckMeta, DeckSnapshot, DocumentChange,
    DocumentId, FailureReporter, HostingError, OwnerId, ProjectName, PublishError,
    PublishFailureRecord, PublishOutcome, PublishStage, PublishedAtGate, PullOutcome,
    PullRequest, PullRequestDraft, PullRequestOutcome, PushRequest, RemoteRepository, RemoteUser,
    RepositoryHost, RepositoryNodeId, RepositoryResolution, RetryPolicy, SkipReason, SoftFailure,
    Substitutions, UserLogin, UserNodeId, WorkingCopy, WorkingCopyError,
};

const TOKEN: &str = "ghp_secret_token_value";
const SCRATCH: &str = "/scratch/publish";

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Ordered record of every port call made during a run.
#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    fn push(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Clone, Copy)]
enum CredentialReply {
    Token,
    NoRecord,
    RecordWithoutToken,
    StoreDown,
}

struct FakeCredentials {
    log: CallLog,
    reply: CredentialReply,
}

#[async_trait]
impl CredentialStore for FakeCredentials {
    async fn find_credential(
        &self,
        owner: &OwnerId,
    ) -> Result<Option<Credential>, CredentialError> {
        self.log.push("find_credential");
        assert_eq!(owner.as_str(), "alice");
        match self.reply {
            CredentialReply::Token => Ok(Some(Credential {
                token: ApiToken::new(TOKEN),
            })),
            CredentialReply::NoRecord => Ok(None),
            CredentialReply::RecordWithoutToken => Ok(Some(Credential { token: None })),
            CredentialReply::StoreDown => Err(CredentialError::Unavailable {
                message: "connection refused".into(),
            }),
        }
    }
}

#[derive(Clone, Copy)]
enum UserReply {
    Resolved,
    Unresolved,
    Unreachable,
}

struct FakeHost {
    log: CallLog,
    user: UserReply,
    repository: RepositoryResolution,
    pull_request: PullRequestOutcome,
    drafts: Mutex<Vec<PullRequestDraft>>,
}

#[async_trait]
impl RepositoryHost for FakeHost {
    async fn resolve_user(&self, token: &ApiToken) -> Result<RemoteUser, HostingError> {
        self.log.push("resolve_user");
        assert_eq!(token.expose(), TOKEN);
        match self.user {
            UserReply::Resolved => Ok(RemoteUser {
                id: UserNodeId::new("U_alice").unwrap(),
                login: UserLogin::new("alice-gh").unwrap(),
            }),
            UserReply::Unresolved => Err(HostingError::UserResolution {
                reason: "viewer missing".into(),
            }),
            UserReply::Unreachable => Err(HostingError::Transport {
                message: "connection reset".into(),
            }),
        }
    }

    async fn find_or_create_repository(
        &self,
        _token: &ApiToken,
        user: &RemoteUser,
        project: &ProjectName,
    ) -> Result<RepositoryResolution, HostingError> {
        self.log.push("find_or_create_repository");
        assert_eq!(user.login.as_str(), "alice-gh");
        assert_eq!(project.as_str(), "deckdeckgo-deck");
        Ok(self.repository.clone())
    }

    async fn create_pull_request(
        &self,
        _token: &ApiToken,
        draft: &PullRequestDraft,
    ) -> Result<PullRequestOutcome, HostingError> {
        self.log.push("create_pull_request");
        self.drafts.lock().unwrap().push(draft.clone());
        Ok(self.pull_request.clone())
    }
}

struct FakeWorkingCopy {
    log: CallLog,
    remote_branch: bool,
    commit: CommitOutcome,
    clone_fails: bool,
    push_fails: bool,
    dirs: Mutex<Vec<PathBuf>>,
    pushed_as: Mutex<Option<String>>,
}

impl FakeWorkingCopy {
    fn visit(&self, call: &'static str, path: &Path) {
        self.log.push(call);
        self.dirs.lock().unwrap().push(path.to_path_buf());
    }
}

#[async_trait]
impl WorkingCopy for FakeWorkingCopy {
    async fn ensure_clean(&self, path: &Path) -> Result<(), WorkingCopyError> {
        self.visit("ensure_clean", path);
        Ok(())
    }

    async fn clone_repository(
        &self,
        remote_url: &str,
        path: &Path,
    ) -> Result<(), WorkingCopyError> {
        self.visit("clone", path);
        assert_eq!(remote_url, "https://github.com/alice-gh/deckdeckgo-deck.git");
        if self.clone_fails {
            return Err(WorkingCopyError::CommandFailed {
                operation: "clone".into(),
                stderr: "fatal: repository not found".into(),
            });
        }
        Ok(())
    }

    async fn checkout_branch(
        &self,
        path: &Path,
        branch: &BranchName,
    ) -> Result<(), WorkingCopyError> {
        self.visit("checkout", path);
        assert_eq!(branch.as_str(), "deckdeckgo");
        Ok(())
    }

    async fn pull_if_remote_branch_exists(
        &self,
        _remote_url: &str,
        path: &Path,
        _branch: &BranchName,
        _identity: &CommitIdentity,
    ) -> Result<PullOutcome, WorkingCopyError> {
        self.visit("pull", path);
        Ok(if self.remote_branch {
            PullOutcome::Pulled
        } else {
            PullOutcome::RemoteBranchMissing
        })
    }

    async fn commit(
        &self,
        path: &Path,
        identity: &CommitIdentity,
        files: &[PathBuf],
        message: &str,
    ) -> Result<CommitOutcome, WorkingCopyError> {
        self.visit("commit", path);
        assert_eq!(files, [PathBuf::from("src/index.html")]);
        assert_eq!(message, "feat: last changes");
        assert_eq!(identity.name, "DeckDeckGo");
        Ok(self.commit)
    }

    async fn push(&self, path: &Path, request: PushRequest<'_>) -> Result<(), WorkingCopyError> {
        self.visit("push", path);
        assert_eq!(request.token.expose(), TOKEN);
        *self.pushed_as.lock().unwrap() = Some(request.login.to_string());
        if self.push_fails {
            return Err(WorkingCopyError::PushFailed {
                login: request.login.clone(),
                project: request.project.clone(),
                branch: request.branch.clone(),
            });
        }
        Ok(())
    }

    async fn discard(&self, path: &Path) -> Result<(), WorkingCopyError> {
        self.visit("discard", path);
        Ok(())
    }
}

struct FakeMaterializer {
    log: CallLog,
    fails: bool,
    seen: Mutex<Vec<(PathBuf, Substitutions)>>,
}

#[async_trait]
impl ContentMaterializer for FakeMaterializer {
    async fn materialize(
        &self,
        entry_file: &Path,
        substitutions: &Substitutions,
    ) -> Result<usize, WorkingCopyError> {
        self.log.push("materialize");
        self.seen
            .lock()
            .unwrap()
            .push((entry_file.to_path_buf(), substitutions.clone()));
        if self.fails {
            return Err(WorkingCopyError::Io {
                path: entry_file.to_path_buf(),
                message: "No such file or directory".into(),
            });
        }
        Ok(substitutions.len())
    }
}

#[derive(Default)]
struct RecordingReporter {
    records: Mutex<Vec<PublishFailureRecord>>,
}

#[async_trait]
impl FailureReporter for RecordingReporter {
    async fn report(&self, record: &PublishFailureRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

// ---------------------------------------------------------------------------
// Scenario builder
// ---------------------------------------------------------------------------

fn repository(default_branch: Option<&str>) -> RemoteRepository {
    RemoteRepository {
        id: RepositoryNodeId::new("R_deck").unwrap(),
        url: "https://github.com/alice-gh/deckdeckgo-deck.git".into(),
        full_name: "alice-gh/deckdeckgo-deck".into(),
        default_branch: default_branch.and_then(BranchName::new),
    }
}

fn pull_request() -> PullRequest {
    PullRequest {
        id: "PR_1".into(),
        number: 1,
        url: "https://github.com/alice-gh/deckdeckgo-deck/pull/1".into(),
    }
}

fn settings() -> PublishSettings {
    PublishSettings::new(
        CommitIdentity {
            name: "DeckDeckGo".into(),
            email: "bot@deckdeckgo.com".into(),
        },
        SCRATCH,
    )
}

struct Scenario {
    credentials: CredentialReply,
    user: UserReply,
    repository: RepositoryResolution,
    remote_branch: bool,
    clone_fails: bool,
    materialize_fails: bool,
    commit: CommitOutcome,
    push_fails: bool,
    pull_request: PullRequestOutcome,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            credentials: CredentialReply::Token,
            user: UserReply::Resolved,
            repository: RepositoryResolution::Created(repository(Some("main"))),
            remote_branch: false,
            clone_fails: false,
            materialize_fails: false,
            commit: CommitOutcome::Committed,
            push_fails: false,
            pull_request: PullRequestOutcome::Opened(pull_request()),
        }
    }
}

struct Harness {
    log: CallLog,
    host: Arc<FakeHost>,
    working_copy: Arc<FakeWorkingCopy>,
    materializer: Arc<FakeMaterializer>,
    reporter: Arc<RecordingReporter>,
    orchestrator: PublishOrchestrator,
}

impl Scenario {
    fn build(self) -> Harness {
        let log = CallLog::default();
        let host = Arc::new(FakeHost {
            log: log.clone(),
            user: self.user,
            repository: self.repository,
            pull_request: self.pull_request,
            drafts: Mutex::default(),
        });
        let working_copy = Arc::new(FakeWorkingCopy {
            log: log.clone(),
            remote_branch: self.remote_branch,
            commit: self.commit,
            clone_fails: self.clone_fails,
            push_fails: self.push_fails,
            dirs: Mutex::default(),
            pushed_as: Mutex::default(),
        });
        let materializer = Arc::new(FakeMaterializer {
            log: log.clone(),
            fails: self.materialize_fails,
            seen: Mutex::default(),
        });
        let reporter = Arc::new(RecordingReporter::default());

        let orchestrator = PublishOrchestrator::new(
            settings(),
            PublishPorts {
                host: host.clone(),
                working_copy: working_copy.clone(),
                materializer: materializer.clone(),
                credentials: Arc::new(FakeCredentials {
                    log: log.clone(),
                    reply: self.credentials,
                }),
                gate: Arc::new(PublishedAtGate),
                reporter: reporter.clone(),
            },
        )
        .unwrap();

        Harness {
            log,
            host,
            working_copy,
            materializer,
            reporter,
            orchestrator,
        }
    }
}

impl Harness {
    fn calls(&self) -> Vec<&'static str> {
        self.log.calls()
    }

    fn reported(&self) -> Vec<PublishFailureRecord> {
        self.reporter.records.lock().unwrap().clone()
    }

    fn working_dirs(&self) -> Vec<PathBuf> {
        self.working_copy.dirs.lock().unwrap().clone()
    }
}

fn deck(owner: Option<&str>, pathname: Option<&str>, published: bool) -> DeckSnapshot {
    DeckSnapshot {
        name: Some("My deck".into()),
        owner_id: owner.map(Into::into),
        meta: Some(DeckMeta {
            title: Some("Demo".into()),
            pathname: pathname.map(Into::into),
            published,
            published_at: published
                .then(|| "2024-05-01T10:00:00Z".parse().unwrap()),
            author: Some(DeckAuthor {
                name: Some("Ada".into()),
            }),
        }),
    }
}

fn change(after: DeckSnapshot) -> DocumentChange {
    DocumentChange {
        document_id: DocumentId::new("deck-1").unwrap(),
        before: Some(deck(Some("alice"), None, false)),
        after: Some(after),
    }
}

fn publishable() -> DocumentChange {
    change(deck(Some("alice"), Some("/alice/demo"), true))
}

const FULL_RUN: [&str; 12] = [
    "find_credential",
    "resolve_user",
    "find_or_create_repository",
    "ensure_clean",
    "clone",
    "checkout",
    "pull",
    "materialize",
    "commit",
    "push",
    "create_pull_request",
    "discard",
];

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn changes_missing_required_fields_cause_no_side_effects() {
    let cases = [
        (deck(Some("alice"), Some("/p"), false), SkipReason::NotPublished),
        (deck(Some("alice"), None, true), SkipReason::MissingPathname),
        (deck(None, Some("/p"), true), SkipReason::MissingOwner),
    ];

    for (after, expected) in cases {
        let harness = Scenario::default().build();
        let outcome = harness.orchestrator.handle(&change(after)).await;

        assert_eq!(outcome, PublishOutcome::Skipped(expected));
        assert!(harness.calls().is_empty(), "unexpected calls: {:?}", harness.calls());
        assert!(harness.reported().is_empty());
    }
}

#[tokio::test]
async fn deleted_document_is_skipped() {
    let harness = Scenario::default().build();
    let deleted = DocumentChange {
        document_id: DocumentId::new("deck-1").unwrap(),
        before: Some(deck(Some("alice"), Some("/p"), true)),
        after: None,
    };

    let outcome = harness.orchestrator.handle(&deleted).await;

    assert_eq!(outcome, PublishOutcome::Skipped(SkipReason::DocumentDeleted));
    assert!(harness.calls().is_empty());
}

#[tokio::test]
async fn resave_of_published_deck_is_skipped() {
    let harness = Scenario::default().build();
    let after = deck(Some("alice"), Some("/alice/demo"), true);
    let resave = DocumentChange {
        document_id: DocumentId::new("deck-1").unwrap(),
        before: Some(after.clone()),
        after: Some(after),
    };

    let outcome = harness.orchestrator.handle(&resave).await;

    assert_eq!(outcome, PublishOutcome::Skipped(SkipReason::AlreadyPublished));
    assert!(harness.calls().is_empty());
}

#[tokio::test]
async fn missing_or_empty_credential_is_skipped() {
    for (reply, expected) in [
        (CredentialReply::NoRecord, SkipReason::NoCredential),
        (CredentialReply::RecordWithoutToken, SkipReason::MalformedCredential),
    ] {
        let harness = Scenario {
            credentials: reply,
            ..Scenario::default()
        }
        .build();

        let outcome = harness.orchestrator.handle(&publishable()).await;

        assert_eq!(outcome, PublishOutcome::Skipped(expected));
        assert_eq!(harness.calls(), ["find_credential"]);
    }
}

#[tokio::test]
async fn unresolvable_user_is_skipped() {
    let harness = Scenario {
        user: UserReply::Unresolved,
        ..Scenario::default()
    }
    .build();

    let outcome = harness.orchestrator.handle(&publishable()).await;

    assert_eq!(
        outcome,
        PublishOutcome::Skipped(SkipReason::UserUnresolved {
            detail: "viewer missing".into()
        })
    );
    assert_eq!(harness.calls(), ["find_credential", "resolve_user"]);
    assert!(harness.reported().is_empty());
}

#[tokio::test]
async fn unavailable_repository_is_skipped() {
    let harness = Scenario {
        repository: RepositoryResolution::Unavailable(SoftFailure::new(
            "template clone returned no repository",
            vec!["Name already exists".into()],
        )),
        ..Scenario::default()
    }
    .build();

    let outcome = harness.orchestrator.handle(&publishable()).await;

    assert!(matches!(
        outcome,
        PublishOutcome::Skipped(SkipReason::RepositoryUnavailable { ref detail })
            if detail.contains("Name already exists")
    ));
    assert!(!harness.calls().contains(&"clone"));
    assert!(!harness.calls().contains(&"discard"));
}

#[tokio::test]
async fn repository_without_url_is_skipped() {
    let mut repo = repository(Some("main"));
    repo.url = String::new();
    let harness = Scenario {
        repository: RepositoryResolution::Existing(repo),
        ..Scenario::default()
    }
    .build();

    let outcome = harness.orchestrator.handle(&publishable()).await;

    assert_eq!(outcome, PublishOutcome::Skipped(SkipReason::MissingRepositoryUrl));
    assert!(!harness.calls().contains(&"ensure_clean"));
}

// ---------------------------------------------------------------------------
// Full runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_publish_creates_repository_and_opens_pull_request() {
    let harness = Scenario::default().build();

    let outcome = harness.orchestrator.handle(&publishable()).await;

    assert_eq!(
        outcome,
        PublishOutcome::Published {
            repository: repository(Some("main")),
            pull_request: Some(pull_request()),
        }
    );
    assert_eq!(harness.calls(), FULL_RUN);

    let drafts = harness.host.drafts.lock().unwrap().clone();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].head.as_str(), "deckdeckgo");
    assert_eq!(drafts[0].base.as_str(), "main");
    assert_eq!(drafts[0].repository.as_str(), "R_deck");

    let seen = harness.materializer.seen.lock().unwrap().clone();
    let (entry_file, substitutions) = &seen[0];
    assert!(entry_file.starts_with(SCRATCH));
    assert!(entry_file.ends_with("src/index.html"));
    assert_eq!(substitutions, &Substitutions::for_deck("Demo", "Ada"));

    assert_eq!(
        harness.working_copy.pushed_as.lock().unwrap().as_deref(),
        Some("alice-gh")
    );
}

#[tokio::test]
async fn existing_repository_and_branch_follow_the_same_steps() {
    let harness = Scenario {
        repository: RepositoryResolution::Existing(repository(Some("main"))),
        remote_branch: true,
        ..Scenario::default()
    }
    .build();

    let outcome = harness.orchestrator.handle(&publishable()).await;

    assert!(matches!(
        outcome,
        PublishOutcome::Published {
            pull_request: Some(_),
            ..
        }
    ));
    assert_eq!(harness.calls(), FULL_RUN);
}

#[tokio::test]
async fn every_working_copy_call_targets_one_private_directory() {
    let harness = Scenario::default().build();

    harness.orchestrator.handle(&publishable()).await;

    let dirs = harness.working_dirs();
    assert!(dirs.iter().all(|d| d == &dirs[0]));
    assert_eq!(dirs[0].parent(), Some(Path::new(SCRATCH)));
    let name = dirs[0].file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("deckdeckgo-deck-alice-"), "{name}");
}

#[tokio::test]
async fn consecutive_runs_use_distinct_directories() {
    let harness = Scenario::default().build();

    harness.orchestrator.handle(&publishable()).await;
    let first = harness.working_dirs()[0].clone();
    harness.orchestrator.handle(&publishable()).await;
    let last = harness.working_dirs().last().cloned().unwrap();

    assert_ne!(first, last);
}

#[tokio::test]
async fn missing_default_branch_targets_fallback_base() {
    let harness = Scenario {
        repository: RepositoryResolution::Existing(repository(None)),
        ..Scenario::default()
    }
    .build();

    harness.orchestrator.handle(&publishable()).await;

    let drafts = harness.host.drafts.lock().unwrap().clone();
    assert_eq!(drafts[0].base.as_str(), "master");
}

#[tokio::test]
async fn republish_without_new_content_still_pushes_and_opens_pull_request() {
    // Second publish: the rolling branch already holds the materialised deck.
    let harness = Scenario {
        repository: RepositoryResolution::Existing(repository(Some("main"))),
        remote_branch: true,
        commit: CommitOutcome::Unchanged,
        ..Scenario::default()
    }
    .build();

    let outcome = harness.orchestrator.handle(&publishable()).await;

    assert_eq!(
        outcome,
        PublishOutcome::Published {
            repository: repository(Some("main")),
            pull_request: Some(pull_request()),
        }
    );
    assert_eq!(harness.calls(), FULL_RUN);
    assert_eq!(
        harness.working_copy.pushed_as.lock().unwrap().as_deref(),
        Some("alice-gh")
    );
    assert_eq!(harness.host.drafts.lock().unwrap().len(), 1);
    assert!(harness.reported().is_empty());
}

#[tokio::test]
async fn pull_request_soft_failure_still_counts_as_published() {
    let harness = Scenario {
        pull_request: PullRequestOutcome::NotOpened(SoftFailure::new(
            "no pull request in response",
            vec!["A pull request already exists".into()],
        )),
        ..Scenario::default()
    }
    .build();

    let outcome = harness.orchestrator.handle(&publishable()).await;

    assert_eq!(
        outcome,
        PublishOutcome::Published {
            repository: repository(Some("main")),
            pull_request: None,
        }
    );
    assert!(harness.reported().is_empty());
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn push_failure_is_reported_without_the_token() {
    let harness = Scenario {
        push_fails: true,
        ..Scenario::default()
    }
    .build();

    let outcome = harness.orchestrator.handle(&publishable()).await;

    let PublishOutcome::Failed(record) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(record.stage, PublishStage::Committed);
    assert_eq!(record.kind, "push");
    assert_eq!(record.owner.as_str(), "alice");
    assert_eq!(record.document.as_str(), "deck-1");
    assert_eq!(record.retry_policy, RetryPolicy::Retryable { after: None });
    assert_eq!(
        record.message,
        "Error while pushing changes to branch deckdeckgo for alice-gh/deckdeckgo-deck"
    );
    assert!(!serde_json::to_string(&record).unwrap().contains(TOKEN));

    assert_eq!(harness.reported(), vec![record]);
    let calls = harness.calls();
    assert!(!calls.contains(&"create_pull_request"));
    assert_eq!(calls.last(), Some(&"discard"));
}

#[tokio::test]
async fn clone_failure_still_discards_the_working_directory() {
    let harness = Scenario {
        clone_fails: true,
        ..Scenario::default()
    }
    .build();

    let outcome = harness.orchestrator.handle(&publishable()).await;

    let PublishOutcome::Failed(record) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(record.stage, PublishStage::RepositoryResolved);
    assert_eq!(record.kind, "git_command");
    assert_eq!(
        harness.calls()[3..],
        ["ensure_clean", "clone", "discard"]
    );
}

#[tokio::test]
async fn materialize_failure_names_the_last_stage_reached() {
    let harness = Scenario {
        materialize_fails: true,
        ..Scenario::default()
    }
    .build();

    let outcome = harness.orchestrator.handle(&publishable()).await;

    let PublishOutcome::Failed(record) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(record.stage, PublishStage::PulledIfApplicable);
    assert_eq!(record.kind, "io");
    assert_eq!(record.retry_policy, RetryPolicy::NonRetryable);
}

#[tokio::test]
async fn transport_failure_before_cloning_is_reported() {
    let harness = Scenario {
        user: UserReply::Unreachable,
        ..Scenario::default()
    }
    .build();

    let outcome = harness.orchestrator.handle(&publishable()).await;

    let PublishOutcome::Failed(record) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(record.stage, PublishStage::CredentialResolved);
    assert_eq!(record.kind, "hosting_transport");
    assert_eq!(harness.reported().len(), 1);
    assert!(!harness.calls().contains(&"discard"));
}

#[tokio::test]
async fn credential_store_outage_is_a_failure() {
    let harness = Scenario {
        credentials: CredentialReply::StoreDown,
        ..Scenario::default()
    }
    .build();

    let outcome = harness.orchestrator.handle(&publishable()).await;

    let PublishOutcome::Failed(record) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(record.stage, PublishStage::PreconditionsChecked);
    assert_eq!(record.kind, "credential_store");
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn invalid_settings_are_rejected_before_any_run() {
    let mut invalid = settings();
    invalid.identity.name = String::new();
    let log = CallLog::default();

    let result = PublishOrchestrator::new(
        invalid,
        PublishPorts {
            host: Arc::new(FakeHost {
                log: log.clone(),
                user: UserReply::Resolved,
                repository: RepositoryResolution::Existing(repository(None)),
                pull_request: PullRequestOutcome::Opened(pull_request()),
                drafts: Mutex::default(),
            }),
            working_copy: Arc::new(FakeWorkingCopy {
                log: log.clone(),
                remote_branch: false,
                commit: CommitOutcome::Committed,
                clone_fails: false,
                push_fails: false,
                dirs: Mutex::default(),
                pushed_as: Mutex::default(),
            }),
            materializer: Arc::new(FakeMaterializer {
                log: log.clone(),
                fails: false,
                seen: Mutex::default(),
            }),
            credentials: Arc::new(FakeCredentials {
                log: log.clone(),
                reply: CredentialReply::Token,
            }),
            gate: Arc::new(PublishedAtGate),
            reporter: Arc::new(RecordingReporter::default()),
        },
    );

    assert!(matches!(result, Err(PublishError::Configuration { .. })));
}
