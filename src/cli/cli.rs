//! Top-level CLI surface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glitchlab")]
#[command(about = "Deterministic pipeline orchestrator for LLM-driven code changes", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output machine-readable JSON instead of formatted tables/panels.
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single task through the pipeline.
    Run {
        /// Path to a YAML task definition. Mutually exclusive with `--objective`.
        #[arg(short = 'f', long)]
        task_file: Option<PathBuf>,

        /// Objective for an ad hoc task, constructed interactively rather
        /// than loaded from a file.
        #[arg(short, long)]
        objective: Option<String>,

        /// Target repository. Defaults to the current directory.
        #[arg(short, long, default_value = ".")]
        repo: PathBuf,

        /// Skip every confirmation gate regardless of `.glitchlab/config.yaml`.
        /// Forced on automatically for subprocesses spawned by `parallel`.
        #[arg(long)]
        auto_approve: bool,

        /// Allow the plan/implementation/fix to touch a protected path
        /// instead of aborting with a boundary violation.
        #[arg(long)]
        allow_core: bool,

        /// Shell command the test/fix loop runs after applying changes.
        /// Overrides `limits.test_command` from the loaded config.
        #[arg(long)]
        test_command: Option<String>,
    },

    /// Run a batch of tasks concurrently, each in its own subprocess and
    /// worktree.
    Parallel {
        /// Paths to YAML task definitions.
        #[arg(short = 'f', long = "task-file", required = true)]
        task_files: Vec<PathBuf>,

        /// Target repository, shared by every task in the batch.
        #[arg(short, long, default_value = ".")]
        repo: PathBuf,

        /// Maximum number of tasks to run at once.
        #[arg(short = 'c', long, default_value = "4")]
        max_concurrency: usize,

        /// Allow every task in the batch to touch a protected path instead
        /// of aborting with a boundary violation.
        #[arg(long)]
        allow_core: bool,

        /// Shell command the test/fix loop runs after applying changes,
        /// applied to every task in the batch.
        #[arg(long)]
        test_command: Option<String>,
    },

    /// Inspect the append-only run history.
    History {
        /// Repository whose `.glitchlab/logs/history.jsonl` to read.
        #[arg(short, long, default_value = ".")]
        repo: PathBuf,

        /// Maximum number of entries to show.
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Show only runs that did not reach a committed change.
        #[arg(long)]
        failures_only: bool,

        /// Show aggregate statistics instead of individual entries.
        #[arg(long)]
        stats: bool,
    },

    /// Write a default `.glitchlab/config.yaml` into a repository.
    Init {
        /// Repository to initialize. Defaults to the current directory.
        #[arg(short, long, default_value = ".")]
        repo: PathBuf,

        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}
