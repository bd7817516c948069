//! End-to-end run of `PipelineController` against a real temporary git
//! repository, with a stub `Router` standing in for the LLM.

use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use glitchlab::domain::error::{PipelineError, TerminalStatus};
use glitchlab::domain::models::{AgentMeta, Config, Task};
use glitchlab::domain::ports::{AutoApprove, Router};
use glitchlab::services::{
    FsChangeApplicator, GitAwareIndexer, JsonlHistoryLog, PipelineController,
};
use tempfile::TempDir;

const PLAN_JSON: &str = r#"{
    "steps": [{"description": "add a line", "action": "modify", "files": ["README.md"]}],
    "risk_level": "low",
    "risk_notes": "",
    "estimated_complexity": "trivial",
    "files_likely_affected": ["README.md"],
    "parse_error": false
}"#;

const IMPLEMENTATION_JSON: &str = r#"{
    "changes": [{"file": "README.md", "body": {"action": "modify", "content": "hello from glitchlab\n"}, "description": "update readme"}],
    "tests_added": [],
    "commit_message": "update readme",
    "summary": "updated readme",
    "parse_error": false
}"#;

fn security_json(verdict: &str) -> String {
    format!(
        r#"{{"verdict": "{verdict}", "issues": [], "dependency_changes": {{}}, "boundary_violations": [], "summary": "", "parse_error": false}}"#
    )
}

const RELEASE_JSON: &str = r#"{
    "version_bump": "patch",
    "reasoning": "docs only",
    "changelog_entry": "Updated README",
    "breaking_changes": [],
    "migration_notes": "",
    "risk_summary": "low",
    "parse_error": false
}"#;

const ARCHIVIST_JSON: &str = r#"{
    "adr": null,
    "doc_updates": [],
    "architecture_notes": "",
    "should_write_adr": false,
    "parse_error": false
}"#;

/// A debugger fix that creates the file the fix-loop test's `test_command`
/// checks for, so the test run fails once and passes once the fix lands.
const DEBUG_FIX_JSON: &str = r#"{
    "diagnosis": "marker file missing",
    "root_cause": "test asserts a file the implementer never created",
    "fix": {"changes": [{"file": "FIXED_MARKER", "body": {"action": "create", "content": "fixed\n"}, "description": "add marker"}], "tests_added": [], "commit_message": "fix marker", "summary": "added marker", "parse_error": false},
    "confidence": "high",
    "should_retry": true,
    "notes": ""
}"#;

/// A debugger fix that keeps retrying but never creates the marker file the
/// test command checks for, used to exercise fix-loop exhaustion.
const DEBUG_WRONG_FIX_JSON: &str = r#"{
    "diagnosis": "still broken",
    "root_cause": "unknown",
    "fix": {"changes": [{"file": "NOTES.md", "body": {"action": "create", "content": "tried something\n"}, "description": "unrelated change"}], "tests_added": [], "commit_message": "attempt", "summary": "", "parse_error": false},
    "confidence": "low",
    "should_retry": true,
    "notes": "could not find a fix"
}"#;

/// Replays a fixed sequence of JSON responses, one per pipeline stage, in
/// call order. Stands in for an LLM transport without any network access.
/// Each response reports a fixed token usage (10 by default), overridable
/// per call to drive the budget ceiling past its limit mid-run.
struct ScriptedRouter {
    responses: Vec<String>,
    tokens: Vec<u64>,
    next: AtomicUsize,
}

impl ScriptedRouter {
    fn new(responses: Vec<String>) -> Self {
        let tokens = vec![10; responses.len()];
        Self { responses, tokens, next: AtomicUsize::new(0) }
    }

    fn with_token_usage(responses: Vec<String>, tokens: Vec<u64>) -> Self {
        Self { responses, tokens, next: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl Router for ScriptedRouter {
    async fn complete_json(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<(String, AgentMeta), PipelineError> {
        let idx = self.next.fetch_add(1, Ordering::SeqCst);
        let body = self
            .responses
            .get(idx)
            .cloned()
            .ok_or_else(|| PipelineError::Other(format!("scripted router exhausted at call {idx}")))?;
        let tokens = self.tokens.get(idx).copied().unwrap_or(10);
        Ok((body, AgentMeta { agent: "test".into(), model: "test-model".into(), tokens, cost: 0.0 }))
    }
}

fn init_repo(dir: &Path) {
    let run = |args: &[&str]| {
        let status = Command::new("git").args(args).current_dir(dir).status().expect("git available");
        assert!(status.success(), "git {args:?} failed");
    };
    run(&["init", "-q", "-b", "main"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "Test"]);
    std::fs::write(dir.join("README.md"), "original readme\n").unwrap();
    run(&["add", "."]);
    run(&["commit", "-q", "-m", "initial"]);
}

fn base_config(repo: &TempDir) -> Config {
    let mut config = Config::default();
    config.workspace.worktree_base = repo.path().join(".worktrees").to_string_lossy().to_string();
    config.workspace.base_branch = "main".to_string();
    config.limits.test_command = Some("git --version".to_string());
    config.limits.max_fix_attempts = 1;
    config.intervention.auto_approve = true;
    config.boundaries.protected_paths = vec![];
    config
}

async fn run_with_config(
    repo: &TempDir,
    config: Config,
    router: ScriptedRouter,
    ceiling: glitchlab::domain::models::BudgetCeiling,
    allow_core: bool,
) -> glitchlab::domain::models::HistoryEntry {
    let history = Arc::new(JsonlHistoryLog::new(repo.path().join(".glitchlab/logs/history.jsonl")));
    let indexer = Arc::new(GitAwareIndexer::new(config.indexer.max_files, config.indexer.max_depth));
    let applicator = Arc::new(FsChangeApplicator::new());
    let budgeted = Arc::new(glitchlab::services::BudgetedRouter::new(
        Box::new(RouterAsTransport(Arc::new(router))),
        ceiling,
        0.0,
    ));

    let controller = PipelineController::new(
        config,
        budgeted,
        history,
        indexer,
        applicator,
        Arc::new(AutoApprove),
    );

    let task = Task::from_interactive("update the readme".to_string(), repo.path().to_path_buf(), 1);
    controller.run(task, &glitchlab::services::NullContextProvider, allow_core).await
}

async fn run_with_responses(responses: Vec<String>) -> glitchlab::domain::models::HistoryEntry {
    let repo = TempDir::new().unwrap();
    init_repo(repo.path());
    let config = base_config(&repo);
    let ceiling = glitchlab::domain::models::BudgetCeiling { max_tokens: 1_000_000, max_cost: 1000.0 };
    run_with_config(&repo, config, ScriptedRouter::new(responses), ceiling, false).await
}

/// Adapts a `Router` (what agent adapters call) to `LlmTransport` (what
/// `BudgetedRouter` wraps), since this test scripts stage responses rather
/// than provider calls directly.
struct RouterAsTransport(Arc<ScriptedRouter>);

#[async_trait]
impl glitchlab::infrastructure::llm::LlmTransport for RouterAsTransport {
    async fn complete(&self, system: &str, user: &str) -> Result<(String, AgentMeta), PipelineError> {
        self.0.complete_json(system, user).await
    }
}

#[tokio::test]
async fn security_block_stops_the_run_before_commit() {
    let entry = run_with_responses(vec![
        PLAN_JSON.to_string(),
        IMPLEMENTATION_JSON.to_string(),
        security_json("block"),
    ])
    .await;

    assert_eq!(entry.status, TerminalStatus::SecurityBlocked);
    assert_eq!(entry.events_summary.security_verdict.as_deref(), Some("block"));
    assert!(entry.pr_url.is_none());
}

#[tokio::test]
async fn full_pipeline_commits_the_change_without_a_pr() {
    let entry = run_with_responses(vec![
        PLAN_JSON.to_string(),
        IMPLEMENTATION_JSON.to_string(),
        security_json("pass"),
        RELEASE_JSON.to_string(),
        ARCHIVIST_JSON.to_string(),
    ])
    .await;

    // No `gh` credentials in the test environment, so push/PR creation is
    // expected to fail; the run should still have gotten through the
    // test/fix loop, security, and release stages and recorded exactly one
    // history entry either way.
    assert!(matches!(entry.status, TerminalStatus::PrCreated | TerminalStatus::Error));
    assert_eq!(entry.events_summary.tests_passed_on_attempt, Some(1));
    assert_eq!(entry.events_summary.plan_steps, Some(1));
}

#[tokio::test]
async fn history_entry_is_recorded_exactly_once_per_run() {
    let repo = TempDir::new().unwrap();
    init_repo(repo.path());
    let history_path = repo.path().join(".glitchlab/logs/history.jsonl");

    let config = base_config(&repo);
    let history = Arc::new(JsonlHistoryLog::new(history_path.clone()));
    let indexer = Arc::new(GitAwareIndexer::new(config.indexer.max_files, config.indexer.max_depth));
    let applicator = Arc::new(FsChangeApplicator::new());
    let router = Arc::new(ScriptedRouter::new(vec![PLAN_JSON.to_string(), IMPLEMENTATION_JSON.to_string(), security_json("block")]));
    let budgeted = Arc::new(glitchlab::services::BudgetedRouter::new(
        Box::new(RouterAsTransport(router)),
        glitchlab::domain::models::BudgetCeiling { max_tokens: 1_000_000, max_cost: 1000.0 },
        0.0,
    ));
    let controller = PipelineController::new(config, budgeted, history.clone(), indexer, applicator, Arc::new(AutoApprove));

    let task = Task::from_interactive("update the readme".to_string(), repo.path().to_path_buf(), 2);
    controller.run(task, &glitchlab::services::NullContextProvider, false).await;

    let recorded: Vec<_> = std::fs::read_to_string(&history_path).unwrap().lines().map(str::to_string).collect();
    assert_eq!(recorded.len(), 1);
}

#[tokio::test]
async fn boundary_block_without_override_stops_the_run() {
    let repo = TempDir::new().unwrap();
    init_repo(repo.path());
    let mut config = base_config(&repo);
    config.boundaries.protected_paths = vec!["README.md".to_string()];
    let ceiling = glitchlab::domain::models::BudgetCeiling { max_tokens: 1_000_000, max_cost: 1000.0 };

    let entry = run_with_config(
        &repo,
        config,
        ScriptedRouter::new(vec![PLAN_JSON.to_string()]),
        ceiling,
        false,
    )
    .await;

    assert_eq!(entry.status, TerminalStatus::BoundaryViolation);
    assert!(entry.pr_url.is_none());
}

#[tokio::test]
async fn boundary_violation_overridden_with_allow_core_continues_the_run() {
    let repo = TempDir::new().unwrap();
    init_repo(repo.path());
    let mut config = base_config(&repo);
    config.boundaries.protected_paths = vec!["README.md".to_string()];
    let ceiling = glitchlab::domain::models::BudgetCeiling { max_tokens: 1_000_000, max_cost: 1000.0 };

    let entry = run_with_config(
        &repo,
        config,
        ScriptedRouter::new(vec![PLAN_JSON.to_string(), IMPLEMENTATION_JSON.to_string(), security_json("block")]),
        ceiling,
        true,
    )
    .await;

    // The boundary violation was logged, not fatal, so the run reaches the
    // next stage that can stop it (security, scripted to block here).
    assert_eq!(entry.status, TerminalStatus::SecurityBlocked);
}

#[tokio::test]
async fn fix_loop_recovers_after_one_failing_test_run() {
    let repo = TempDir::new().unwrap();
    init_repo(repo.path());
    let mut config = base_config(&repo);
    config.limits.test_command = Some("cat FIXED_MARKER".to_string());
    config.limits.max_fix_attempts = 2;
    let ceiling = glitchlab::domain::models::BudgetCeiling { max_tokens: 1_000_000, max_cost: 1000.0 };

    let entry = run_with_config(
        &repo,
        config,
        ScriptedRouter::new(vec![
            PLAN_JSON.to_string(),
            IMPLEMENTATION_JSON.to_string(),
            DEBUG_FIX_JSON.to_string(),
            security_json("pass"),
            RELEASE_JSON.to_string(),
            ARCHIVIST_JSON.to_string(),
        ]),
        ceiling,
        false,
    )
    .await;

    assert!(matches!(entry.status, TerminalStatus::PrCreated | TerminalStatus::Error));
    assert_eq!(entry.events_summary.tests_passed_on_attempt, Some(2));
    assert_eq!(entry.events_summary.fix_attempts, Some(1));
}

#[tokio::test]
async fn fix_loop_exhaustion_ends_the_run_as_tests_failed() {
    let repo = TempDir::new().unwrap();
    init_repo(repo.path());
    let mut config = base_config(&repo);
    config.limits.test_command = Some("cat FIXED_MARKER".to_string());
    config.limits.max_fix_attempts = 2;
    let ceiling = glitchlab::domain::models::BudgetCeiling { max_tokens: 1_000_000, max_cost: 1000.0 };

    let entry = run_with_config(
        &repo,
        config,
        ScriptedRouter::new(vec![
            PLAN_JSON.to_string(),
            IMPLEMENTATION_JSON.to_string(),
            DEBUG_WRONG_FIX_JSON.to_string(),
            DEBUG_WRONG_FIX_JSON.to_string(),
        ]),
        ceiling,
        false,
    )
    .await;

    assert_eq!(entry.status, TerminalStatus::TestsFailed);
    assert_eq!(entry.events_summary.fix_attempts, Some(2));
    assert_eq!(entry.events_summary.tests_passed_on_attempt, None);
    assert!(entry.pr_url.is_none());
}

#[tokio::test]
async fn no_test_command_configured_skips_straight_to_security() {
    let repo = TempDir::new().unwrap();
    init_repo(repo.path());
    let mut config = base_config(&repo);
    config.limits.test_command = None;
    let ceiling = glitchlab::domain::models::BudgetCeiling { max_tokens: 1_000_000, max_cost: 1000.0 };

    let entry = run_with_config(
        &repo,
        config,
        ScriptedRouter::new(vec![PLAN_JSON.to_string(), IMPLEMENTATION_JSON.to_string(), security_json("block")]),
        ceiling,
        false,
    )
    .await;

    assert_eq!(entry.status, TerminalStatus::SecurityBlocked);
    assert_eq!(entry.events_summary.tests_passed_on_attempt, None);
    assert_eq!(entry.events_summary.fix_attempts, None);
}

#[tokio::test]
async fn budget_exhaustion_mid_plan_stops_before_implementer_is_called() {
    let repo = TempDir::new().unwrap();
    init_repo(repo.path());
    let config = base_config(&repo);
    // The Planner's call records 950 tokens against a 1000-token ceiling;
    // the Implementer's far larger prompt (it carries the plan, the repo
    // index, and the diff context) can't fit in the 50 tokens left.
    let ceiling = glitchlab::domain::models::BudgetCeiling { max_tokens: 1_000, max_cost: 1000.0 };
    let router = ScriptedRouter::with_token_usage(
        vec![PLAN_JSON.to_string(), IMPLEMENTATION_JSON.to_string()],
        vec![950, 10],
    );

    let entry = run_with_config(&repo, config, router, ceiling, false).await;

    assert_eq!(entry.status, TerminalStatus::BudgetExceeded);
    assert_eq!(entry.events_summary.plan_steps, Some(1));
    assert_eq!(entry.budget.tokens_used, 950);
}
