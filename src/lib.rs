//! glitchlab — deterministic pipeline controller for automated code changes.
//!
//! Takes a human-described [`domain::models::Task`] against a target
//! repository and drives it, without per-step human intervention, through a
//! fixed sequence of LLM-backed agents (plan, implement, test/fix, security,
//! release, archive) into a branch and optional pull request. See
//! `SPEC_FULL.md` for the full component breakdown.

pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod cli;

pub use domain::error::{PipelineError, TerminalStatus};
pub use domain::models::Task;
