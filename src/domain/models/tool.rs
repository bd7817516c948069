//! Result of a single sandboxed shell command execution.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub returncode: i32,
    /// False only when the sandbox rejected the command outright before it
    /// ran (`returncode` is `-1` and `stderr` carries the rejection reason).
    pub allowed: bool,
}

impl ToolResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.allowed && self.returncode == 0
    }

    #[must_use]
    pub fn rejected(command: String, reason: String) -> Self {
        Self {
            command,
            stdout: String::new(),
            stderr: reason,
            returncode: -1,
            allowed: false,
        }
    }

    #[must_use]
    pub fn timed_out(command: String) -> Self {
        Self {
            command,
            stdout: String::new(),
            stderr: "TIMEOUT: command exceeded its timeout".to_string(),
            returncode: -1,
            allowed: true,
        }
    }
}

/// One entry in a tool sandbox's execution log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolLogEntry {
    pub command: String,
    pub decision: ToolDecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolDecision {
    Allowed,
    Denied,
    Blocked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_allowed_and_zero_exit() {
        let ok = ToolResult {
            command: "cargo test".into(),
            stdout: String::new(),
            stderr: String::new(),
            returncode: 0,
            allowed: true,
        };
        assert!(ok.success());

        let rejected = ToolResult::rejected("rm -rf /".into(), "blocked pattern".into());
        assert!(!rejected.success());
        assert_eq!(rejected.returncode, -1);
    }

    #[test]
    fn timed_out_is_allowed_but_failed() {
        let t = ToolResult::timed_out("cargo test".into());
        assert!(t.allowed);
        assert!(!t.success());
        assert!(t.stderr.starts_with("TIMEOUT"));
    }
}
