//! Allow/deny-gated shell command execution.

use crate::domain::models::{Config, ToolDecision, ToolLogEntry, ToolResult};
use crate::domain::ports::ToolSandbox;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, warn};

/// Executes shell commands in a fixed working directory, rejecting anything
/// that matches a blocked substring pattern or fails to match an allowed
/// command prefix. Deny-list is checked before the allow-list: a command
/// that happens to start with an allowed prefix is still rejected if it also
/// contains a blocked pattern.
pub struct ShellSandbox {
    working_dir: PathBuf,
    allowed_tools: Vec<String>,
    blocked_patterns: Vec<String>,
    log: Mutex<Vec<ToolLogEntry>>,
}

impl ShellSandbox {
    #[must_use]
    pub fn new(working_dir: PathBuf, config: &Config) -> Self {
        Self {
            working_dir,
            allowed_tools: config.sandbox.allowed_tools.clone(),
            blocked_patterns: config.sandbox.blocked_patterns.clone(),
            log: Mutex::new(Vec::new()),
        }
    }

    fn is_blocked(&self, command: &str) -> Option<&str> {
        self.blocked_patterns
            .iter()
            .find(|p| command.contains(p.as_str()))
            .map(String::as_str)
    }

    fn is_allowed(&self, command: &str) -> bool {
        let trimmed = command.trim();
        self.allowed_tools
            .iter()
            .any(|prefix| trimmed.starts_with(prefix.as_str()))
    }

    #[must_use]
    pub fn execution_log(&self) -> Vec<ToolLogEntry> {
        self.log.lock().expect("sandbox log poisoned").clone()
    }

    fn log_decision(&self, command: &str, decision: ToolDecision) {
        self.log.lock().expect("sandbox log poisoned").push(ToolLogEntry {
            command: command.to_string(),
            decision,
        });
    }
}

#[async_trait]
impl ToolSandbox for ShellSandbox {
    async fn execute(&self, command: &str, timeout: Duration) -> ToolResult {
        if let Some(pattern) = self.is_blocked(command) {
            warn!(command, pattern, "command blocked by sandbox");
            self.log_decision(command, ToolDecision::Blocked);
            return ToolResult::rejected(command.to_string(), format!("blocked pattern: {pattern}"));
        }

        if !self.is_allowed(command) {
            warn!(command, "command denied by sandbox allow-list");
            self.log_decision(command, ToolDecision::Denied);
            return ToolResult::rejected(command.to_string(), "command not in allow-list".to_string());
        }

        self.log_decision(command, ToolDecision::Allowed);
        info!(command, "executing sandboxed command");

        let output = tokio::time::timeout(
            timeout,
            Command::new("sh")
                .arg("-c")
                .arg(command)
                .current_dir(&self.working_dir)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output(),
        )
        .await;

        match output {
            Ok(Ok(output)) => ToolResult {
                command: command.to_string(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                returncode: output.status.code().unwrap_or(-1),
                allowed: true,
            },
            Ok(Err(e)) => ToolResult {
                command: command.to_string(),
                stdout: String::new(),
                stderr: format!("failed to spawn: {e}"),
                returncode: -1,
                allowed: true,
            },
            Err(_) => ToolResult::timed_out(command.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox() -> ShellSandbox {
        ShellSandbox::new(std::env::temp_dir(), &Config::default())
    }

    #[tokio::test]
    async fn blocked_pattern_wins_even_with_allowed_prefix() {
        let config = Config::default();
        let sandbox = ShellSandbox::new(std::env::temp_dir(), &config);
        let result = sandbox
            .execute("git push && sudo rm -rf /", Duration::from_secs(1))
            .await;
        assert!(!result.allowed);
        assert_eq!(result.returncode, -1);
    }

    #[tokio::test]
    async fn disallowed_command_is_denied() {
        let sandbox = sandbox();
        let result = sandbox.execute("curl evil.example", Duration::from_secs(1)).await;
        assert!(!result.allowed);
    }

    #[tokio::test]
    async fn allowed_command_runs() {
        let sandbox = sandbox();
        let result = sandbox.execute("cargo --version", Duration::from_secs(5)).await;
        assert!(result.allowed);
    }

    #[tokio::test]
    async fn timeout_sets_sentinel_stderr() {
        let config = Config {
            sandbox: crate::domain::models::config::SandboxConfig {
                allowed_tools: vec!["sleep".to_string()],
                ..Config::default().sandbox
            },
            ..Config::default()
        };
        let sandbox = ShellSandbox::new(std::env::temp_dir(), &config);
        let result = sandbox.execute("sleep 5", Duration::from_millis(50)).await;
        assert!(result.allowed);
        assert!(result.stderr.starts_with("TIMEOUT"));
    }
}
