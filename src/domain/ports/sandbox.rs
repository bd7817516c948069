use crate::domain::models::ToolResult;
use async_trait::async_trait;
use std::time::Duration;

/// Allow/deny-gated shell command execution, scoped to a working directory.
#[async_trait]
pub trait ToolSandbox: Send + Sync {
    async fn execute(&self, command: &str, timeout: Duration) -> ToolResult;
}
