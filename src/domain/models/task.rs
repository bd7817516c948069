//! Task domain model: the unit of work the pipeline drives end to end.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a task definition came from. Recorded for history/logging only —
/// this crate does not author task definitions, only consume them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSource {
    /// Loaded from a YAML file on disk.
    File,
    /// Constructed interactively from operator input.
    Interactive,
    /// Constructed from a `gh issue view` lookup.
    Issue,
}

/// A task to drive through the pipeline against a target repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier, used for the worktree path and branch name.
    pub task_id: String,
    /// Human objective for the change, fed to the Planner.
    pub objective: String,
    /// Path to the repository the task runs against.
    pub repo_path: PathBuf,
    /// Free-form constraints the Planner and Implementer must respect, in
    /// addition to whatever a context provider prepends.
    #[serde(default)]
    pub constraints: Vec<String>,
    /// Paths the operator additionally wants treated as read-only for this
    /// task, beyond the config's protected paths.
    #[serde(default)]
    pub extra_protected_paths: Vec<String>,
    /// Where this task definition came from.
    #[serde(default = "default_source")]
    pub source: TaskSource,
}

fn default_source() -> TaskSource {
    TaskSource::File
}

impl Task {
    /// Load a task from a YAML file's fields. Does not validate objective
    /// content — only that the required fields are present and well-typed.
    pub fn from_yaml_str(yaml: &str, repo_path: PathBuf) -> Result<Self, serde_yaml::Error> {
        #[derive(Deserialize)]
        struct Raw {
            task_id: String,
            objective: String,
            #[serde(default)]
            constraints: Vec<String>,
            #[serde(default)]
            extra_protected_paths: Vec<String>,
        }
        let raw: Raw = serde_yaml::from_str(yaml)?;
        Ok(Self {
            task_id: raw.task_id,
            objective: raw.objective,
            repo_path,
            constraints: raw.constraints,
            extra_protected_paths: raw.extra_protected_paths,
            source: TaskSource::File,
        })
    }

    /// Construct a task from interactive operator input (no file involved).
    pub fn from_interactive(objective: String, repo_path: PathBuf, now_millis: i64) -> Self {
        Self {
            task_id: format!("interactive-{now_millis}"),
            objective,
            repo_path,
            constraints: Vec::new(),
            extra_protected_paths: Vec::new(),
            source: TaskSource::Interactive,
        }
    }

    /// The git branch name this task's worktree runs on.
    #[must_use]
    pub fn branch_name(&self) -> String {
        format!("glitchlab/{}", self.task_id)
    }
}
