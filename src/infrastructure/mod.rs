//! Infrastructure layer: adapters for everything outside the process —
//! the LLM provider, the filesystem-backed config and log sinks, and the
//! GitHub CLI for pull requests.

pub mod config;
pub mod llm;
pub mod logging;
pub mod pr;
