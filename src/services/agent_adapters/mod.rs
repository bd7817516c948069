//! One `AgentAdapter` implementation per pipeline role, all built on the
//! same fenced-JSON recovery path in `common`.

pub mod archivist;
pub mod common;
pub mod debugger;
pub mod implementer;
pub mod planner;
pub mod release;
pub mod security;

pub use archivist::ArchivistAdapter;
pub use debugger::DebuggerAdapter;
pub use implementer::ImplementerAdapter;
pub use planner::PlannerAdapter;
pub use release::ReleaseAdapter;
pub use security::SecurityAdapter;
