//! Domain layer: pure types and ports (traits) the services layer implements.

pub mod error;
pub mod models;
pub mod ports;

pub use error::{PipelineError, TerminalStatus};
