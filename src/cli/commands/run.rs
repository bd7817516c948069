//! Implementation of the `glitchlab run` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::cli::output::{output, render_run_outcome, CommandOutput};
use crate::domain::models::{Config, Task};
use crate::domain::ports::{AutoApprove, ConfirmationGate};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::llm::AnthropicTransport;
use crate::services::{
    BudgetedRouter, DirectoryContextProvider, FsChangeApplicator, GitAwareIndexer,
    JsonlHistoryLog, PipelineController,
};

/// An operator confirmation gate backed by a real terminal prompt.
struct InteractiveConfirm;

impl ConfirmationGate for InteractiveConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        use std::io::Write as _;
        print!("{prompt} [y/N] ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub task_id: String,
    pub status: String,
    pub pr_url: Option<String>,
    pub exit_code: i32,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        self.status.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub struct RunArgs {
    pub task_file: Option<PathBuf>,
    pub objective: Option<String>,
    pub repo: PathBuf,
    pub auto_approve: bool,
    pub allow_core: bool,
    pub test_command: Option<String>,
}

pub async fn execute(args: RunArgs, json_mode: bool) -> Result<i32> {
    let repo_path = std::fs::canonicalize(&args.repo)
        .with_context(|| format!("repo path does not exist: {}", args.repo.display()))?;

    let task = match (&args.task_file, &args.objective) {
        (Some(path), _) => {
            let yaml = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read task file {}", path.display()))?;
            Task::from_yaml_str(&yaml, repo_path.clone()).context("failed to parse task file")?
        }
        (None, Some(objective)) => {
            let now_millis = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as i64;
            Task::from_interactive(objective.clone(), repo_path.clone(), now_millis)
        }
        (None, None) => bail!("one of --task-file or --objective is required"),
    };

    let mut config: Config = ConfigLoader::load().context("failed to load configuration")?;
    if args.auto_approve {
        config.intervention.auto_approve = true;
    }
    if let Some(test_command) = args.test_command.clone() {
        config.limits.test_command = Some(test_command);
    }

    let api_key = std::env::var("ANTHROPIC_API_KEY").context("ANTHROPIC_API_KEY is not set")?;
    let transport = AnthropicTransport::new(
        api_key,
        config.router.model.clone(),
        config.router.cost_per_1k_tokens.clone(),
    )
    .context("failed to build LLM transport")?;
    let cost_per_1k = config.router.cost_per_1k_tokens.get(&config.router.model).copied().unwrap_or(0.003);
    let ceiling = crate::domain::models::BudgetCeiling {
        max_tokens: config.router.max_tokens,
        max_cost: config.router.max_cost,
    };
    let router = Arc::new(BudgetedRouter::new(Box::new(transport), ceiling, cost_per_1k));

    let history_path = repo_path.join(".glitchlab/logs/history.jsonl");
    let history = Arc::new(JsonlHistoryLog::new(history_path));
    let indexer = Arc::new(GitAwareIndexer::new(config.indexer.max_files, config.indexer.max_depth));
    let applicator = Arc::new(FsChangeApplicator::new());

    let confirmation: Arc<dyn ConfirmationGate> = if config.intervention.auto_approve {
        Arc::new(AutoApprove)
    } else {
        Arc::new(InteractiveConfirm)
    };

    let controller = PipelineController::new(config, router, history, indexer, applicator, confirmation);
    let context_provider = DirectoryContextProvider::new(&repo_path);

    let entry = controller.run(task, &context_provider, args.allow_core).await;
    let exit_code = entry.status.exit_code();

    if json_mode {
        let result = RunOutput {
            task_id: entry.task_id.clone(),
            status: entry.status.to_string(),
            pr_url: entry.pr_url.clone(),
            exit_code,
        };
        output(&result, true);
    } else {
        println!("{}", render_run_outcome(&entry));
    }

    Ok(exit_code)
}
