//! Error taxonomy and terminal run statuses.
//!
//! `PipelineError` covers the failure modes the controller can hit while
//! driving a task through the stage sequence. `TerminalStatus` is the closed
//! set of outcomes a run can end in; it is recorded in history and drives the
//! process exit code.

use thiserror::Error;

/// Errors produced while driving a task through the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A router call was rejected before it was made because it would exceed
    /// the remaining token or cost budget.
    #[error("router call would exceed budget: {0}")]
    BudgetExceeded(String),

    /// The LLM router call itself failed (transport, provider error, non-JSON
    /// response the agent adapter could not recover from).
    #[error("router call failed: {0}")]
    Router(String),

    /// The plan or the agent's proposed changes touch protected paths.
    #[error("boundary violation: {0:?}")]
    Boundary(Vec<String>),

    /// A requested shell command was rejected by the tool sandbox.
    #[error("tool sandbox violation: {0}")]
    ToolViolation(String),

    /// A git worktree operation failed.
    #[error("workspace operation failed: {0}")]
    Workspace(String),

    /// A subprocess exited non-zero or could not be spawned.
    #[error("subprocess failed: {0}")]
    Subprocess(String),

    /// The operator interrupted the run at a confirmation gate.
    #[error("operator interrupted the run")]
    Interrupted,

    /// Catch-all for failures that don't fit another variant.
    #[error("unexpected error: {0}")]
    Other(String),
}

impl PipelineError {
    /// The terminal status this error maps to, when it ends a run outright.
    #[must_use]
    pub const fn terminal_status(&self) -> TerminalStatus {
        match self {
            Self::BudgetExceeded(_) => TerminalStatus::BudgetExceeded,
            Self::Boundary(_) => TerminalStatus::BoundaryViolation,
            Self::Interrupted => TerminalStatus::Interrupted,
            Self::Router(_)
            | Self::ToolViolation(_)
            | Self::Workspace(_)
            | Self::Subprocess(_)
            | Self::Other(_) => TerminalStatus::Error,
        }
    }
}

/// The closed set of outcomes a pipeline run can end in.
///
/// Every run records exactly one of these to the history log, and the CLI
/// maps it to a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStatus {
    /// A pull request was opened for the change.
    PrCreated,
    /// The change was committed to its branch but no PR was opened.
    Committed,
    /// The planner could not produce a usable plan.
    PlanFailed,
    /// The implementer could not produce usable changes.
    ImplementationFailed,
    /// The plan or implementation touched a protected path without override.
    BoundaryViolation,
    /// The test/fix loop exhausted its attempts without a passing run.
    TestsFailed,
    /// The security review verdict was `block` and was not overridden.
    SecurityBlocked,
    /// The operator declined the pre-PR confirmation gate.
    PrCancelled,
    /// A router call was rejected by the budget ceiling.
    BudgetExceeded,
    /// The operator interrupted the run.
    Interrupted,
    /// An unrecoverable error occurred outside the above categories.
    Error,
}

impl TerminalStatus {
    /// The process exit code for this status, per the CLI contract.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::PrCreated | Self::Committed => 0,
            _ => 1,
        }
    }

    /// Whether this status represents a run that did not reach a committed
    /// change — used by the history log's `get_failures` query.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        !matches!(self, Self::PrCreated | Self::Committed)
    }
}

impl std::fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PrCreated => "pr_created",
            Self::Committed => "committed",
            Self::PlanFailed => "plan_failed",
            Self::ImplementationFailed => "implementation_failed",
            Self::BoundaryViolation => "boundary_violation",
            Self::TestsFailed => "tests_failed",
            Self::SecurityBlocked => "security_blocked",
            Self::PrCancelled => "pr_cancelled",
            Self::BudgetExceeded => "budget_exceeded",
            Self::Interrupted => "interrupted",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}
