//! Implementation of the `glitchlab history` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{format_history_stats, format_history_table, output, CommandOutput};
use crate::domain::models::{HistoryEntry, HistoryStats};
use crate::domain::ports::HistoryLog;
use crate::services::JsonlHistoryLog;

#[derive(Debug, Serialize)]
pub enum HistoryOutput {
    Entries(Vec<HistoryEntry>),
    Stats(HistoryStats),
}

impl CommandOutput for HistoryOutput {
    fn to_human(&self) -> String {
        match self {
            Self::Entries(entries) => format_history_table(entries, console::colors_enabled()),
            Self::Stats(stats) => format_history_stats(stats),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub struct HistoryArgs {
    pub repo: PathBuf,
    pub limit: usize,
    pub failures_only: bool,
    pub stats: bool,
}

pub fn execute(args: HistoryArgs, json_mode: bool) -> Result<i32> {
    let repo_path = std::fs::canonicalize(&args.repo)
        .with_context(|| format!("repo path does not exist: {}", args.repo.display()))?;
    let log = JsonlHistoryLog::new(repo_path.join(".glitchlab/logs/history.jsonl"));

    let result = if args.stats {
        HistoryOutput::Stats(log.get_stats())
    } else if args.failures_only {
        HistoryOutput::Entries(log.get_failures(args.limit))
    } else {
        HistoryOutput::Entries(log.get_recent(args.limit))
    };

    output(&result, json_mode);
    Ok(0)
}
