//! Pull request creation via the `gh` CLI.

pub mod gh_cli;

pub use gh_cli::GhCliPrCreator;
