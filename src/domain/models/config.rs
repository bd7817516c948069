//! Typed configuration loaded by the infrastructure config loader.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub model: String,
    /// Cost in USD per 1000 tokens, keyed by model id, for estimating a
    /// prospective call's cost before making it.
    pub cost_per_1k_tokens: BTreeMap<String, f64>,
    pub max_tokens: u64,
    pub max_cost: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        let mut cost_per_1k_tokens = BTreeMap::new();
        cost_per_1k_tokens.insert("claude-sonnet-4".to_string(), 0.003);
        Self {
            model: "claude-sonnet-4".to_string(),
            cost_per_1k_tokens,
            max_tokens: 500_000,
            max_cost: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub worktree_base: String,
    pub base_branch: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            worktree_base: ".glitchlab/worktrees".to_string(),
            base_branch: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub allowed_tools: Vec<String>,
    pub blocked_patterns: Vec<String>,
    pub default_timeout_secs: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            allowed_tools: vec![
                "cargo".to_string(),
                "git".to_string(),
                "ls".to_string(),
                "cat".to_string(),
            ],
            blocked_patterns: vec![
                "rm -rf /".to_string(),
                "sudo ".to_string(),
                ":(){:|:&};:".to_string(),
                "> /dev/sda".to_string(),
            ],
            default_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    pub protected_paths: Vec<String>,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            protected_paths: vec![
                ".github/workflows".to_string(),
                ".glitchlab".to_string(),
                "Cargo.lock".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_fix_attempts: u32,
    pub test_timeout_secs: u64,
    /// Shell command the test/fix loop runs in the worktree after applying
    /// changes. Run through the same `ToolSandbox` as any other command, so
    /// it must match an allowed prefix. `None` means the repo has no
    /// configured test command; the fix loop is skipped entirely and the
    /// pipeline goes straight from Implement to Security.
    pub test_command: Option<String>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_fix_attempts: 3,
            test_timeout_secs: 300,
            test_command: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterventionConfig {
    pub pause_after_plan: bool,
    pub pause_before_pr: bool,
    pub auto_approve: bool,
}

impl Default for InterventionConfig {
    fn default() -> Self {
        Self {
            pause_after_plan: false,
            pause_before_pr: true,
            auto_approve: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    Daily,
    Hourly,
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub log_dir: Option<String>,
    pub enable_stdout: bool,
    pub rotation: RotationPolicy,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            log_dir: None,
            enable_stdout: true,
            rotation: RotationPolicy::Daily,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub max_files: usize,
    pub max_depth: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            max_files: 200,
            max_depth: 8,
        }
    }
}

/// The fully merged, validated configuration for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub router: RouterConfig,
    pub workspace: WorkspaceConfig,
    pub sandbox: SandboxConfig,
    pub boundaries: BoundaryConfig,
    pub limits: LimitsConfig,
    pub intervention: InterventionConfig,
    pub logging: LoggingConfig,
    pub indexer: IndexerConfig,
}
