use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::instrument;

use crate::domain::error::PipelineError;
use crate::domain::ports::PrCreator;

const GH_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens a pull request by shelling out to the GitHub CLI from the task's
/// worktree directory. `gh` is expected to already be authenticated; this
/// layer does not manage credentials.
pub struct GhCliPrCreator {
    working_dir: std::path::PathBuf,
    base_branch: String,
}

impl GhCliPrCreator {
    #[must_use]
    pub fn new(working_dir: std::path::PathBuf, base_branch: String) -> Self {
        Self { working_dir, base_branch }
    }
}

#[async_trait]
impl PrCreator for GhCliPrCreator {
    #[instrument(skip(self, body), fields(branch = %branch))]
    async fn create(&self, branch: &str, title: &str, body: &str) -> Result<String, PipelineError> {
        let output = timeout(
            GH_TIMEOUT,
            Command::new("gh")
                .args([
                    "pr",
                    "create",
                    "--title",
                    title,
                    "--body",
                    body,
                    "--base",
                    &self.base_branch,
                    "--head",
                    branch,
                ])
                .current_dir(&self.working_dir)
                .output(),
        )
        .await
        .map_err(|_| PipelineError::Subprocess("gh pr create timed out".to_string()))?
        .map_err(|e| PipelineError::Subprocess(format!("failed to spawn gh: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::Subprocess(format!("gh pr create failed: {stderr}")));
        }

        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if url.is_empty() {
            return Err(PipelineError::Subprocess("gh pr create returned no URL".to_string()));
        }
        Ok(url)
    }
}
