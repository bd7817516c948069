use crate::domain::error::PipelineError;
use crate::domain::models::{HistoryEntry, HistoryStats};

/// Append-only record of completed runs, used to build failure context for
/// future attempts and to report run statistics.
pub trait HistoryLog: Send + Sync {
    fn record(&self, entry: &HistoryEntry) -> Result<(), PipelineError>;
    fn get_recent(&self, n: usize) -> Vec<HistoryEntry>;
    fn get_failures(&self, n: usize) -> Vec<HistoryEntry>;
    fn get_stats(&self) -> HistoryStats;
    fn get_all(&self) -> Vec<HistoryEntry>;

    /// A markdown block summarizing the most recent failed runs across
    /// every task, not just this one — a different task's failure (a
    /// boundary violation, a recurring security block) is just as useful
    /// for the Planner to avoid repeating as one on the same task_id.
    fn build_failure_context(&self, max_entries: usize) -> Option<String> {
        let failures = self.get_failures(max_entries);
        if failures.is_empty() {
            return None;
        }
        let mut out = String::from("=== RECENT FAILURES (learn from these) ===\n");
        for entry in &failures {
            out.push_str(&format!(
                "- Task: {} | Status: {} | Error: {}\n",
                entry.task_id,
                entry.status,
                entry.error.as_deref().unwrap_or("N/A")
            ));
            if let Some(verdict) = &entry.events_summary.security_verdict {
                out.push_str(&format!("  Security: {verdict}\n"));
            }
            if let Some(attempts) = entry.events_summary.fix_attempts {
                out.push_str(&format!("  Fix attempts: {attempts}\n"));
            }
        }
        Some(out)
    }
}
