use crate::domain::error::PipelineError;
use async_trait::async_trait;

/// Opens a pull request for a pushed branch.
#[async_trait]
pub trait PrCreator: Send + Sync {
    async fn create(&self, branch: &str, title: &str, body: &str) -> Result<String, PipelineError>;
}
