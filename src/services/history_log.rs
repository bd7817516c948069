//! Append-only JSONL run history.

use crate::domain::error::{PipelineError, TerminalStatus};
use crate::domain::models::{HistoryEntry, HistoryStats};
use crate::domain::ports::HistoryLog;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// Reads/writes `.glitchlab/logs/history.jsonl`. Malformed lines are skipped
/// on read (never fail the whole read) and logged at `warn`.
pub struct JsonlHistoryLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlHistoryLog {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    fn read_entries(&self) -> Vec<HistoryEntry> {
        let Ok(file) = std::fs::File::open(&self.path) else {
            return Vec::new();
        };
        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(&line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping malformed history line");
                    None
                }
            })
            .collect()
    }
}

impl HistoryLog for JsonlHistoryLog {
    fn record(&self, entry: &HistoryEntry) -> Result<(), PipelineError> {
        let _guard = self.write_lock.lock().expect("history log lock poisoned");
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PipelineError::Other(format!("cannot create history dir: {e}")))?;
        }
        let line = serde_json::to_string(entry)
            .map_err(|e| PipelineError::Other(format!("cannot serialize history entry: {e}")))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PipelineError::Other(format!("cannot open history log: {e}")))?;
        writeln!(file, "{line}")
            .map_err(|e| PipelineError::Other(format!("cannot append history entry: {e}")))?;
        Ok(())
    }

    fn get_recent(&self, n: usize) -> Vec<HistoryEntry> {
        let mut entries = self.read_entries();
        entries.reverse();
        entries.truncate(n);
        entries
    }

    fn get_failures(&self, n: usize) -> Vec<HistoryEntry> {
        let mut entries: Vec<_> = self
            .read_entries()
            .into_iter()
            .filter(|e| e.status.is_failure())
            .collect();
        entries.reverse();
        entries.truncate(n);
        entries
    }

    fn get_stats(&self) -> HistoryStats {
        let entries = self.read_entries();
        let total_runs = entries.len();
        let mut statuses = std::collections::BTreeMap::new();
        let mut total_cost = 0.0;
        let mut total_tokens = 0u64;
        let mut successes = 0usize;
        for entry in &entries {
            *statuses.entry(entry.status.to_string()).or_insert(0) += 1;
            total_cost += entry.budget.cost_used;
            total_tokens += entry.budget.tokens_used;
            if matches!(entry.status, TerminalStatus::PrCreated | TerminalStatus::Committed) {
                successes += 1;
            }
        }
        let success_rate = if total_runs == 0 {
            0.0
        } else {
            successes as f64 / total_runs as f64
        };
        let avg_cost_per_run = if total_runs == 0 {
            0.0
        } else {
            total_cost / total_runs as f64
        };
        HistoryStats {
            total_runs,
            statuses,
            success_rate,
            total_cost,
            total_tokens,
            avg_cost_per_run,
        }
    }

    fn get_all(&self) -> Vec<HistoryEntry> {
        self.read_entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::BudgetState;
    use std::io::Write as _;

    fn entry(task_id: &str, status: TerminalStatus) -> HistoryEntry {
        HistoryEntry {
            timestamp: chrono::Utc::now(),
            task_id: task_id.to_string(),
            status,
            pr_url: None,
            branch: None,
            error: None,
            budget: BudgetState {
                tokens_used: 100,
                cost_used: 0.05,
                calls_made: 2,
            },
            events_summary: Default::default(),
        }
    }

    #[test]
    fn record_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlHistoryLog::new(dir.path().join("history.jsonl"));
        log.record(&entry("t1", TerminalStatus::PrCreated)).unwrap();
        log.record(&entry("t1", TerminalStatus::TestsFailed)).unwrap();

        let recent = log.get_recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].status, TerminalStatus::TestsFailed);

        let failures = log.get_failures(10);
        assert_eq!(failures.len(), 1);

        let stats = log.get_stats();
        assert_eq!(stats.total_runs, 2);
        assert!((stats.success_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let log = JsonlHistoryLog::new(path.clone());
        log.record(&entry("t1", TerminalStatus::Committed)).unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json at all").unwrap();

        log.record(&entry("t2", TerminalStatus::Error)).unwrap();

        assert_eq!(log.get_all().len(), 2);
    }

    #[test]
    fn failure_context_draws_from_every_task_not_just_one() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlHistoryLog::new(dir.path().join("history.jsonl"));
        log.record(&entry("t1", TerminalStatus::TestsFailed)).unwrap();
        log.record(&entry("t2", TerminalStatus::SecurityBlocked)).unwrap();

        let ctx = log.build_failure_context(5).unwrap();
        assert!(ctx.contains("RECENT FAILURES"));
        assert!(ctx.contains("Task: t1"));
        assert!(ctx.contains("Task: t2"));
    }
}
