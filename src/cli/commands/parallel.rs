//! Implementation of the `glitchlab parallel` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::services::ParallelRunner;

#[derive(Debug, Serialize)]
pub struct ParallelOutput {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<String>,
}

impl CommandOutput for ParallelOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("{}/{} task(s) succeeded", self.succeeded, self.total)];
        for failure in &self.failures {
            lines.push(format!("  failed: {failure}"));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub struct ParallelArgs {
    pub task_files: Vec<PathBuf>,
    pub repo: PathBuf,
    pub max_concurrency: usize,
    pub allow_core: bool,
    pub test_command: Option<String>,
}

pub async fn execute(args: ParallelArgs, json_mode: bool) -> Result<i32> {
    let repo_path = std::fs::canonicalize(&args.repo)
        .with_context(|| format!("repo path does not exist: {}", args.repo.display()))?;
    let binary = std::env::current_exe().context("failed to resolve current executable path")?;

    let runner = ParallelRunner::new(binary, args.max_concurrency, args.allow_core, args.test_command.clone());
    let results = runner.run_all(args.task_files, &repo_path).await;

    let total = results.len();
    let failures: Vec<String> = results
        .iter()
        .filter(|r| r.exit_code != 0)
        .map(|r| format!("{}: exit {} — {}", r.task_file.display(), r.exit_code, r.stderr_tail.trim()))
        .collect();
    let succeeded = total - failures.len();

    let result = ParallelOutput { total, succeeded, failed: failures.len(), failures };
    output(&result, json_mode);

    Ok(if result.failed == 0 { 0 } else { 1 })
}
