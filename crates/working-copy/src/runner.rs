//! Execution of `git` commands.
//!
//! [`GitRunner`] is the seam between command sequencing (in [`crate::git`])
//! and process spawning, so sequencing can be tested without a `git` binary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use pipeline::WorkingCopyError;
use tokio::process::Command;
use tracing::trace;

/// Captured result of one git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// A successful invocation that printed `stdout`.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed invocation that printed `stderr`.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs git with the given arguments.
///
/// A non-zero exit is **not** an error at this level; it is reported through
/// [`GitOutput::success`] so the caller can decide what the failure means.
#[async_trait]
pub trait GitRunner: Send + Sync {
    async fn run(&self, cwd: Option<&Path>, args: &[OsString]) -> Result<GitOutput, WorkingCopyError>;
}

/// [`GitRunner`] that spawns the `git` executable.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: PathBuf,
}

impl SystemGit {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new("git")
    }
}

#[async_trait]
impl GitRunner for SystemGit {
    async fn run(&self, cwd: Option<&Path>, args: &[OsString]) -> Result<GitOutput, WorkingCopyError> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            // Never block on a credential prompt.
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .map_err(|e| WorkingCopyError::Spawn {
                message: e.to_string(),
            })?;
        trace!(status = ?output.status, "git exited");

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
