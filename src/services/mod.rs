//! Application services: concrete implementations of the domain ports, the
//! per-role agent adapters, and the controller that drives a task through
//! all of them.

pub mod agent_adapters;
pub mod boundary_enforcer;
pub mod budget_tracker;
pub mod change_applicator;
pub mod context_provider;
pub mod history_log;
pub mod parallel_runner;
pub mod pipeline_controller;
pub mod repo_indexer;
pub mod tool_sandbox;
pub mod workspace_service;

pub use boundary_enforcer::PathPrefixBoundary;
pub use budget_tracker::BudgetedRouter;
pub use change_applicator::FsChangeApplicator;
pub use context_provider::{DirectoryContextProvider, NullContextProvider};
pub use history_log::JsonlHistoryLog;
pub use parallel_runner::ParallelRunner;
pub use pipeline_controller::PipelineController;
pub use repo_indexer::GitAwareIndexer;
pub use tool_sandbox::ShellSandbox;
pub use workspace_service::GitWorkspace;
