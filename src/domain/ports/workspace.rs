use crate::domain::error::PipelineError;
use async_trait::async_trait;

/// Git worktree lifecycle for a single task.
#[async_trait]
pub trait Workspace: Send + Sync {
    async fn create(&mut self) -> Result<(), PipelineError>;
    async fn commit(&mut self, message: &str) -> Result<String, PipelineError>;
    async fn diff_stat(&self) -> Result<String, PipelineError>;
    async fn diff_full(&self) -> Result<String, PipelineError>;
    async fn push(&mut self) -> Result<(), PipelineError>;
    /// Best-effort; never propagates an error, mirroring the controller's
    /// `finally`-style unconditional cleanup.
    async fn cleanup(&mut self);
}
