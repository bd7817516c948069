//! Domain models: pure data types with no infrastructure concerns.

pub mod agent_context;
pub mod agent_result;
pub mod budget;
pub mod config;
pub mod history;
pub mod implementation;
pub mod plan;
pub mod task;
pub mod tool;
pub mod workspace;

pub use agent_context::{AgentContext, AgentExtra, StageState};
pub use agent_result::{
    AdrDraft, AgentMeta, ArchivistResult, DebugResult, DependencyChanges, DocUpdate,
    DocUpdateAction, ReleaseResult, SecurityIssue, SecurityResult, SecurityVerdict, Severity,
    VersionBump,
};
pub use budget::{BudgetCeiling, BudgetState};
pub use config::Config;
pub use history::{EventsSummary, HistoryEntry, HistoryStats};
pub use implementation::{
    ApplyMethod, FileChange, FileChangeBody, ImplementationResult, SurgicalBlock, TestChange,
};
pub use plan::{Plan, PlanStep, RiskLevel, StepAction};
pub use task::{Task, TaskSource};
pub use tool::{ToolDecision, ToolLogEntry, ToolResult};
pub use workspace::WorkspaceState;
