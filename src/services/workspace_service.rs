//! Git worktree lifecycle for a single task's isolated working directory.

use crate::domain::error::PipelineError;
use crate::domain::models::WorkspaceState;
use crate::domain::ports::Workspace;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

const GIT_TIMEOUT: Duration = Duration::from_secs(60);

/// `Workspace` implementation backed by `git worktree`.
pub struct GitWorkspace {
    state: WorkspaceState,
}

impl GitWorkspace {
    #[must_use]
    pub fn new(state: WorkspaceState) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn worktree_path(&self) -> &Path {
        &self.state.worktree_path
    }

    async fn run_git(&self, dir: &Path, args: &[&str]) -> Result<(i32, String, String), PipelineError> {
        run_git_in(dir, args).await
    }

    async fn run_git_checked(&self, dir: &Path, args: &[&str]) -> Result<String, PipelineError> {
        let (code, stdout, stderr) = self.run_git(dir, args).await?;
        if code != 0 {
            return Err(PipelineError::Workspace(format!(
                "git {} failed ({code}): {stderr}",
                args.join(" ")
            )));
        }
        Ok(stdout)
    }
}

async fn run_git_in(dir: &Path, args: &[&str]) -> Result<(i32, String, String), PipelineError> {
    let output = tokio::time::timeout(
        GIT_TIMEOUT,
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output(),
    )
    .await
    .map_err(|_| PipelineError::Workspace(format!("git {} timed out", args.join(" "))))?
    .map_err(|e| PipelineError::Workspace(format!("failed to spawn git {}: {e}", args.join(" "))))?;

    Ok((
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    ))
}

#[async_trait]
impl Workspace for GitWorkspace {
    #[instrument(skip(self), fields(task_branch = %self.state.branch_name))]
    async fn create(&mut self) -> Result<(), PipelineError> {
        if self.state.worktree_path.exists() {
            debug!("worktree already exists, reusing");
            self.state.created = true;
            return Ok(());
        }

        // Idempotent: branch creation failure (already exists) is tolerated,
        // only `git worktree add` failure is fatal.
        let _ = self
            .run_git(
                &self.state.repo_path,
                &["branch", &self.state.branch_name, &self.state.base_branch],
            )
            .await?;

        let worktree_path = self.state.worktree_path.to_string_lossy().into_owned();
        self.run_git_checked(
            &self.state.repo_path,
            &["worktree", "add", &worktree_path, &self.state.branch_name],
        )
        .await?;

        info!(worktree = %worktree_path, "worktree created");
        self.state.created = true;
        Ok(())
    }

    async fn commit(&mut self, message: &str) -> Result<String, PipelineError> {
        self.run_git_checked(&self.state.worktree_path, &["add", "-A"])
            .await?;

        let status = self
            .run_git_checked(&self.state.worktree_path, &["status", "--porcelain"])
            .await?;
        if status.trim().is_empty() {
            debug!("nothing to commit");
        } else {
            self.run_git_checked(&self.state.worktree_path, &["commit", "-m", message])
                .await?;
        }

        let sha = self
            .run_git_checked(&self.state.worktree_path, &["rev-parse", "HEAD"])
            .await?;
        Ok(sha.trim().to_string())
    }

    async fn diff_stat(&self) -> Result<String, PipelineError> {
        self.run_git_checked(
            &self.state.worktree_path,
            &["diff", "--stat", &self.state.base_branch],
        )
        .await
    }

    async fn diff_full(&self) -> Result<String, PipelineError> {
        self.run_git_checked(&self.state.worktree_path, &["diff", &self.state.base_branch])
            .await
    }

    async fn push(&mut self) -> Result<(), PipelineError> {
        self.run_git_checked(
            &self.state.worktree_path,
            &["push", "-u", "origin", &self.state.branch_name],
        )
        .await?;
        Ok(())
    }

    async fn cleanup(&mut self) {
        if !self.state.created {
            return;
        }
        let worktree_path = self.state.worktree_path.to_string_lossy().into_owned();
        let (code, _, stderr) = match self
            .run_git(
                &self.state.repo_path,
                &["worktree", "remove", "--force", &worktree_path],
            )
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "worktree remove failed to spawn");
                return;
            }
        };
        if code != 0 {
            warn!(stderr = %stderr, "git worktree remove failed, falling back to rmdir");
            let _ = tokio::fs::remove_dir_all(&self.state.worktree_path).await;
        }
        let _ = self.run_git(&self.state.repo_path, &["worktree", "prune"]).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn init_repo(dir: &Path) {
        let run = |args: &[&str]| {
            StdCommand::new("git")
                .args(args)
                .current_dir(dir)
                .output()
                .unwrap();
        };
        run(&["init", "-q", "-b", "main"]);
        run(&["config", "user.email", "t@example.com"]);
        run(&["config", "user.name", "t"]);
        std::fs::write(dir.join("README.md"), "hi\n").unwrap();
        run(&["add", "-A"]);
        run(&["commit", "-q", "-m", "init"]);
    }

    #[tokio::test]
    async fn create_commit_and_cleanup_round_trip() {
        let repo = tempfile::tempdir().unwrap();
        init_repo(repo.path());

        let state = WorkspaceState::new(
            repo.path().to_path_buf(),
            ".glitchlab/worktrees",
            "t1",
            "main".to_string(),
        );
        let mut ws = GitWorkspace::new(state);
        ws.create().await.unwrap();
        assert!(ws.worktree_path().exists());

        std::fs::write(ws.worktree_path().join("new.txt"), "content\n").unwrap();
        let sha = ws.commit("glitchlab: t1").await.unwrap();
        assert_eq!(sha.len(), 40);

        let stat = ws.diff_stat().await.unwrap();
        assert!(stat.contains("new.txt"));

        ws.cleanup().await;
        assert!(!ws.worktree_path().exists());
    }

    #[tokio::test]
    async fn create_is_idempotent() {
        let repo = tempfile::tempdir().unwrap();
        init_repo(repo.path());
        let state = WorkspaceState::new(
            repo.path().to_path_buf(),
            ".glitchlab/worktrees",
            "t2",
            "main".to_string(),
        );
        let mut ws = GitWorkspace::new(state);
        ws.create().await.unwrap();
        ws.create().await.unwrap();
        ws.cleanup().await;
    }
}
