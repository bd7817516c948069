use crate::domain::error::PipelineError;
use async_trait::async_trait;
use std::path::Path;

/// Builds a bounded, agent-readable summary of a repository's file tree.
#[async_trait]
pub trait RepoIndexer: Send + Sync {
    async fn index(&self, repo_path: &Path) -> Result<String, PipelineError>;
}
