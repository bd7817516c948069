//! Process-based parallel execution: each task runs as a fresh invocation of
//! this binary, isolated in its own worktree, bounded by a concurrency limit.
//! A background run has no operator attached to a terminal, so every spawned
//! invocation forces `--auto-approve` regardless of the parent's config.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// One task's outcome from a parallel batch.
#[derive(Debug, Clone)]
pub struct ParallelTaskResult {
    pub task_file: PathBuf,
    pub exit_code: i32,
    pub stderr_tail: String,
}

/// Fans a batch of task files out to subprocess invocations of `binary`,
/// running at most `max_concurrency` at a time.
pub struct ParallelRunner {
    binary: PathBuf,
    max_concurrency: usize,
    allow_core: bool,
    test_command: Option<String>,
}

impl ParallelRunner {
    #[must_use]
    pub fn new(binary: PathBuf, max_concurrency: usize, allow_core: bool, test_command: Option<String>) -> Self {
        Self { binary, max_concurrency: max_concurrency.max(1), allow_core, test_command }
    }

    pub async fn run_all(&self, task_files: Vec<PathBuf>, repo_path: &Path) -> Vec<ParallelTaskResult> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut handles = Vec::with_capacity(task_files.len());

        for task_file in task_files {
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore never closed");
            let binary = self.binary.clone();
            let repo_path = repo_path.to_path_buf();
            let allow_core = self.allow_core;
            let test_command = self.test_command.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                Self::run_one(&binary, &task_file, &repo_path, allow_core, test_command.as_deref()).await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => warn!(error = %e, "parallel task subprocess panicked before completing"),
            }
        }
        results
    }

    async fn run_one(
        binary: &Path,
        task_file: &Path,
        repo_path: &Path,
        allow_core: bool,
        test_command: Option<&str>,
    ) -> ParallelTaskResult {
        info!(task_file = %task_file.display(), "spawning parallel run");
        let mut command = Command::new(binary);
        command
            .arg("run")
            .arg("--task-file")
            .arg(task_file)
            .arg("--repo")
            .arg(repo_path)
            .arg("--auto-approve");
        if allow_core {
            command.arg("--allow-core");
        }
        if let Some(test_command) = test_command {
            command.arg("--test-command").arg(test_command);
        }
        let output = command.output().await;

        match output {
            Ok(output) => ParallelTaskResult {
                task_file: task_file.to_path_buf(),
                exit_code: output.status.code().unwrap_or(-1),
                stderr_tail: tail(&String::from_utf8_lossy(&output.stderr), 2000),
            },
            Err(e) => ParallelTaskResult {
                task_file: task_file.to_path_buf(),
                exit_code: -1,
                stderr_tail: format!("failed to spawn: {e}"),
            },
        }
    }
}

fn tail(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut start = s.len() - max_len;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    s[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_only_the_trailing_bytes() {
        let s = "a".repeat(100);
        assert_eq!(tail(&s, 10).len(), 10);
    }

    #[test]
    fn tail_is_noop_under_the_limit() {
        assert_eq!(tail("short", 100), "short");
    }

    #[tokio::test]
    async fn run_all_reports_spawn_failure_for_a_missing_binary() {
        let runner = ParallelRunner::new(PathBuf::from("/nonexistent/glitchlab-binary"), 2, false, None);
        let results = runner
            .run_all(vec![PathBuf::from("task.yaml")], Path::new("/tmp"))
            .await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].exit_code, -1);
    }
}
