//! One recorded run in the append-only history log.

use super::budget::BudgetState;
use crate::domain::error::TerminalStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event-derived highlights summarized into the history entry, so
/// `get_stats`/`build_failure_context` don't need to replay the full event
/// log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsSummary {
    pub plan_steps: Option<usize>,
    pub plan_risk: Option<String>,
    pub tests_passed_on_attempt: Option<u32>,
    pub security_verdict: Option<String>,
    pub version_bump: Option<String>,
    pub fix_attempts: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub task_id: String,
    pub status: TerminalStatus,
    #[serde(default)]
    pub pr_url: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    pub budget: BudgetState,
    #[serde(default)]
    pub events_summary: EventsSummary,
}

/// Aggregate statistics over a slice of history entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_runs: usize,
    pub statuses: std::collections::BTreeMap<String, usize>,
    pub success_rate: f64,
    pub total_cost: f64,
    pub total_tokens: u64,
    pub avg_cost_per_run: f64,
}
