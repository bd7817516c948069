//! glitchlab CLI entry point

use glitchlab::cli::{
    commands::{history, init, parallel, run},
    Cli, Commands,
};
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Run { task_file, objective, repo, auto_approve, allow_core, test_command } => {
            let config = glitchlab::infrastructure::config::ConfigLoader::load().unwrap_or_default();
            glitchlab::infrastructure::logging::LoggerImpl::init(&config.logging)?;
            run::execute(
                run::RunArgs { task_file, objective, repo, auto_approve, allow_core, test_command },
                cli.json,
            )
            .await?
        }
        Commands::Parallel { task_files, repo, max_concurrency, allow_core, test_command } => {
            let config = glitchlab::infrastructure::config::ConfigLoader::load().unwrap_or_default();
            glitchlab::infrastructure::logging::LoggerImpl::init(&config.logging)?;
            parallel::execute(
                parallel::ParallelArgs { task_files, repo, max_concurrency, allow_core, test_command },
                cli.json,
            )
            .await?
        }
        Commands::History { repo, limit, failures_only, stats } => {
            history::execute(history::HistoryArgs { repo, limit, failures_only, stats }, cli.json)?
        }
        Commands::Init { repo, force } => init::execute(init::InitArgs { repo, force }, cli.json)?,
    };

    std::process::exit(exit_code);
}
