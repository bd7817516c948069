//! CLI interface module
//!
//! This module contains the top-level argument parser, one handler module
//! per subcommand, and terminal output formatting (tables, panels).

pub mod cli;
pub mod commands;
pub mod output;

pub use cli::{Cli, Commands};
