//! Workspace state: the git worktree a task's changes land in.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct WorkspaceState {
    pub repo_path: PathBuf,
    pub worktree_path: PathBuf,
    pub branch_name: String,
    pub base_branch: String,
    /// Set once `create` has succeeded; `cleanup` only removes a worktree it
    /// created, mirroring the idempotent-create / best-effort-cleanup
    /// contract.
    pub created: bool,
}

impl WorkspaceState {
    #[must_use]
    pub fn new(
        repo_path: PathBuf,
        worktree_base: &str,
        task_id: &str,
        base_branch: String,
    ) -> Self {
        Self {
            worktree_path: repo_path.join(worktree_base).join(task_id),
            branch_name: format!("glitchlab/{task_id}"),
            repo_path,
            base_branch,
            created: false,
        }
    }
}
