//! Domain ports (traits) the services layer implements and the controller
//! depends on, never a concrete type.

pub mod applicator;
pub mod boundary;
pub mod confirmation;
pub mod context_provider;
pub mod history;
pub mod indexer;
pub mod pr_creator;
pub mod router;
pub mod sandbox;
pub mod workspace;

pub use applicator::ChangeApplicator;
pub use boundary::BoundaryEnforcer;
pub use confirmation::{AutoApprove, ConfirmationGate};
pub use context_provider::ContextProvider;
pub use history::HistoryLog;
pub use indexer::RepoIndexer;
pub use pr_creator::PrCreator;
pub use router::{AgentAdapter, Router};
pub use sandbox::ToolSandbox;
pub use workspace::Workspace;
