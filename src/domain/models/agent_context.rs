//! The context object threaded through every agent adapter call.

use super::plan::Plan;
use super::task::Task;
use serde::{Deserialize, Serialize};

/// The immediately-preceding stage's output, typed per stage rather than an
/// open map — every consumer in the pipeline is known ahead of time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageState {
    /// No prior stage has produced output yet (the Planner's input state).
    None,
    /// Output of the Planner stage.
    Plan(Plan),
    /// Output of the Implementer (or a Debugger fix) stage.
    Implementation(super::implementation::ImplementationResult),
    /// Output of the Security stage.
    Security(super::agent_result::SecurityResult),
    /// Output of the Release stage.
    Release(super::agent_result::ReleaseResult),
}

/// Named, closed set of extra fields a downstream agent may need, in place
/// of an open `extra` map — every field here has exactly one producer and
/// consumer pair in the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentExtra {
    /// Full unified diff of the worktree against its base branch, given to
    /// the Security stage.
    pub diff_full: Option<String>,
    /// `git diff --stat` summary, given to the Release stage.
    pub diff_stat: Option<String>,
    /// Captured stderr/stdout of a failing test run, truncated, given to the
    /// Debugger.
    pub error_output: Option<String>,
    /// The test command that failed, given to the Debugger.
    pub test_command: Option<String>,
    /// Which fix attempt this is (1-indexed), given to the Debugger.
    pub attempt: Option<u32>,
    /// Prior fix attempts in this run that did not fix the failure.
    pub previous_fixes: Vec<String>,
    /// Paths this run additionally treats as protected, given to Security.
    pub protected_paths: Vec<String>,
    /// Markdown file listing produced by the repo indexer.
    pub repo_index_context: Option<String>,
    /// Markdown prefix produced by a context provider.
    pub prelude_prefix: Option<String>,
    /// Markdown block summarizing recent failed runs of this task id.
    pub failure_context: Option<String>,
}

/// Everything an agent adapter needs to build its request: the task, the
/// prior stage's output, and whatever extra fields that role needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentContext {
    pub task: Task,
    pub previous_output: StageState,
    pub extra: AgentExtra,
}

impl AgentContext {
    #[must_use]
    pub fn new(task: Task) -> Self {
        Self {
            task,
            previous_output: StageState::None,
            extra: AgentExtra::default(),
        }
    }
}
