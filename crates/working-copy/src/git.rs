//! Git-backed [`WorkingCopy`].
//!
//! Each operation is a short fixed sequence of git commands run in the
//! working directory named by the caller. The push URL embeds the user's
//! token, so push failures are replaced wholesale with a sanitised error.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pipeline::{
    BranchName, CommitIdentity, CommitOutcome, PullOutcome, PushRequest, WorkingCopy,
    WorkingCopyError,
};
use tracing::{debug, instrument, warn};

use crate::remote::PushEndpoint;
use crate::runner::{GitOutput, GitRunner, SystemGit};

/// [`WorkingCopy`] implemented with the git command line.
#[derive(Debug, Clone)]
pub struct GitWorkingCopy<R = SystemGit> {
    runner: R,
    push_endpoint: PushEndpoint,
}

impl GitWorkingCopy<SystemGit> {
    /// Uses the `git` executable from `PATH` and pushes to `push_endpoint`.
    pub fn new(push_endpoint: PushEndpoint) -> Self {
        Self::with_runner(SystemGit::default(), push_endpoint)
    }
}

impl<R: GitRunner> GitWorkingCopy<R> {
    pub fn with_runner(runner: R, push_endpoint: PushEndpoint) -> Self {
        Self {
            runner,
            push_endpoint,
        }
    }

    /// Runs git and turns a non-zero exit into [`WorkingCopyError::CommandFailed`].
    async fn git<I, S>(
        &self,
        operation: &str,
        cwd: Option<&Path>,
        args: I,
    ) -> Result<GitOutput, WorkingCopyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let output = self.runner.run(cwd, &args).await?;
        if output.success {
            Ok(output)
        } else {
            Err(WorkingCopyError::CommandFailed {
                operation: operation.to_string(),
                stderr: output.stderr.trim().to_string(),
            })
        }
    }

    async fn configure_identity(
        &self,
        path: &Path,
        identity: &CommitIdentity,
    ) -> Result<(), WorkingCopyError> {
        self.git("config", Some(path), ["config", "user.name", identity.name.as_str()])
            .await?;
        self.git("config", Some(path), ["config", "user.email", identity.email.as_str()])
            .await?;
        Ok(())
    }

    async fn remote_has_branch(
        &self,
        remote_url: &str,
        path: &Path,
        branch: &BranchName,
    ) -> Result<bool, WorkingCopyError> {
        let wanted = format!("refs/heads/{branch}");
        let output = self
            .git(
                "ls-remote",
                Some(path),
                ["ls-remote", "--heads", remote_url, wanted.as_str()],
            )
            .await?;
        // ls-remote patterns match on ref suffixes, so compare exactly.
        Ok(output
            .stdout
            .lines()
            .filter_map(|line| line.split_whitespace().nth(1))
            .any(|reference| reference == wanted))
    }
}

async fn remove_dir_if_present(path: &Path) -> Result<(), WorkingCopyError> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(WorkingCopyError::io(path, e)),
    }
}

#[async_trait]
impl<R: GitRunner> WorkingCopy for GitWorkingCopy<R> {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn ensure_clean(&self, path: &Path) -> Result<(), WorkingCopyError> {
        remove_dir_if_present(path).await
    }

    #[instrument(skip(self, remote_url), fields(path = %path.display()))]
    async fn clone_repository(
        &self,
        remote_url: &str,
        path: &Path,
    ) -> Result<(), WorkingCopyError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| WorkingCopyError::io(parent, e))?;
        }
        let args: [OsString; 4] = [
            "clone".into(),
            "--".into(),
            remote_url.into(),
            path.as_os_str().to_owned(),
        ];
        self.git("clone", None, args).await?;
        debug!("Repository cloned");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn checkout_branch(
        &self,
        path: &Path,
        branch: &BranchName,
    ) -> Result<(), WorkingCopyError> {
        self.git("checkout", Some(path), ["checkout", "-B", branch.as_str()])
            .await?;
        Ok(())
    }

    #[instrument(skip(self, remote_url, identity), fields(path = %path.display()))]
    async fn pull_if_remote_branch_exists(
        &self,
        remote_url: &str,
        path: &Path,
        branch: &BranchName,
        identity: &CommitIdentity,
    ) -> Result<PullOutcome, WorkingCopyError> {
        if !self.remote_has_branch(remote_url, path, branch).await? {
            debug!("Remote branch does not exist yet; skipping pull");
            return Ok(PullOutcome::RemoteBranchMissing);
        }

        let name = format!("user.name={}", identity.name);
        let email = format!("user.email={}", identity.email);
        self.git(
            "pull",
            Some(path),
            [
                "-c",
                name.as_str(),
                "-c",
                email.as_str(),
                "pull",
                "--no-rebase",
                "--no-edit",
                remote_url,
                branch.as_str(),
            ],
        )
        .await?;
        Ok(PullOutcome::Pulled)
    }

    #[instrument(skip(self, identity, message), fields(path = %path.display(), files = files.len()))]
    async fn commit(
        &self,
        path: &Path,
        identity: &CommitIdentity,
        files: &[PathBuf],
        message: &str,
    ) -> Result<CommitOutcome, WorkingCopyError> {
        self.configure_identity(path, identity).await?;

        let pathspec = || files.iter().map(|f| f.as_os_str().to_owned());

        let add: Vec<OsString> = [OsString::from("add"), OsString::from("--")]
            .into_iter()
            .chain(pathspec())
            .collect();
        self.git("add", Some(path), add).await?;

        let status: Vec<OsString> = ["status", "--porcelain", "--"]
            .map(OsString::from)
            .into_iter()
            .chain(pathspec())
            .collect();
        if self.git("status", Some(path), status).await?.stdout.trim().is_empty() {
            debug!("Nothing changed in the enumerated files");
            return Ok(CommitOutcome::Unchanged);
        }

        // A pathspec after `--` makes git commit only those paths, even if
        // other changes are staged.
        let commit: Vec<OsString> = ["commit", "-m", message, "--"]
            .map(OsString::from)
            .into_iter()
            .chain(pathspec())
            .collect();
        self.git("commit", Some(path), commit).await?;
        Ok(CommitOutcome::Committed)
    }

    #[instrument(skip_all, fields(login = %request.login, project = %request.project, branch = %request.branch))]
    async fn push(&self, path: &Path, request: PushRequest<'_>) -> Result<(), WorkingCopyError> {
        let sanitized = || WorkingCopyError::PushFailed {
            login: request.login.clone(),
            project: request.project.clone(),
            branch: request.branch.clone(),
        };

        self.configure_identity(path, request.identity).await?;

        let url = self
            .push_endpoint
            .authenticated_url(request.login, request.token, request.project)
            .ok_or_else(sanitized)?;
        let args: [OsString; 3] = [
            "push".into(),
            url.as_str().into(),
            request.branch.as_str().into(),
        ];

        match self.runner.run(Some(path), &args).await {
            Ok(output) if output.success => Ok(()),
            // The output and the spawn error may both contain the URL; drop them.
            _ => {
                warn!("Push failed");
                Err(sanitized())
            }
        }
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn discard(&self, path: &Path) -> Result<(), WorkingCopyError> {
        remove_dir_if_present(path).await
    }
}
