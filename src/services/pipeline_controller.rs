//! Drives a single `Task` through the full stage sequence: Planner, boundary
//! check, Implementer, change application, test/fix loop, Security, Release,
//! Archivist, commit, and push/PR — then records exactly one `HistoryEntry`
//! regardless of how the run ended.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::error::{PipelineError, TerminalStatus};
use crate::domain::models::{
    AgentContext, ArchivistResult, Config, DocUpdateAction, EventsSummary, HistoryEntry,
    SecurityVerdict, StageState, Task,
};
use crate::domain::ports::{
    AgentAdapter, BoundaryEnforcer, ChangeApplicator, ConfirmationGate, ContextProvider,
    HistoryLog, PrCreator, RepoIndexer, ToolSandbox, Workspace,
};
use crate::infrastructure::pr::GhCliPrCreator;

use super::agent_adapters::{
    ArchivistAdapter, DebuggerAdapter, ImplementerAdapter, PlannerAdapter, ReleaseAdapter,
    SecurityAdapter,
};
use super::boundary_enforcer::PathPrefixBoundary;
use super::budget_tracker::BudgetedRouter;
use super::tool_sandbox::ShellSandbox;
use super::workspace_service::GitWorkspace;

const MAX_CAPTURED_OUTPUT: usize = 4000;

struct RunOutcome {
    status: TerminalStatus,
    pr_url: Option<String>,
    events_summary: EventsSummary,
}

/// Owns the six agent adapters and the shared infrastructure a run needs;
/// one instance is built per process and reused across tasks (the test/fix
/// loop and worktree are per-run state, held locally in `run`).
pub struct PipelineController {
    config: Config,
    router: Arc<BudgetedRouter>,
    history: Arc<dyn HistoryLog>,
    indexer: Arc<dyn RepoIndexer>,
    applicator: Arc<dyn ChangeApplicator>,
    confirmation: Arc<dyn ConfirmationGate>,
    planner: PlannerAdapter,
    implementer: ImplementerAdapter,
    debugger: DebuggerAdapter,
    security: SecurityAdapter,
    release: ReleaseAdapter,
    archivist: ArchivistAdapter,
}

impl PipelineController {
    #[must_use]
    pub fn new(
        config: Config,
        router: Arc<BudgetedRouter>,
        history: Arc<dyn HistoryLog>,
        indexer: Arc<dyn RepoIndexer>,
        applicator: Arc<dyn ChangeApplicator>,
        confirmation: Arc<dyn ConfirmationGate>,
    ) -> Self {
        let router_dyn = router.clone() as Arc<dyn crate::domain::ports::Router>;
        Self {
            planner: PlannerAdapter::new(router_dyn.clone()),
            implementer: ImplementerAdapter::new(router_dyn.clone()),
            debugger: DebuggerAdapter::new(router_dyn.clone()),
            security: SecurityAdapter::new(router_dyn.clone()),
            release: ReleaseAdapter::new(router_dyn.clone()),
            archivist: ArchivistAdapter::new(router_dyn),
            config,
            router,
            history,
            indexer,
            applicator,
            confirmation,
        }
    }

    /// Drives `task` to completion and records exactly one history entry,
    /// regardless of which terminal status the run reached. `allow_core`
    /// is the operator's per-run override of the boundary enforcer: when
    /// `true`, a protected-path touch is logged but not fatal.
    pub async fn run(
        &self,
        task: Task,
        context_provider: &dyn ContextProvider,
        allow_core: bool,
    ) -> HistoryEntry {
        info!(task_id = %task.task_id, "starting pipeline run");

        let mut workspace = GitWorkspace::new(crate::domain::models::WorkspaceState::new(
            task.repo_path.clone(),
            &self.config.workspace.worktree_base,
            &task.task_id,
            self.config.workspace.base_branch.clone(),
        ));

        let outcome = self.drive(&task, &mut workspace, context_provider, allow_core).await;
        workspace.cleanup().await;

        let budget = self.router.budget_state();
        let (status, pr_url, error, events_summary) = match outcome {
            Ok(o) => (o.status, o.pr_url, None, o.events_summary),
            Err(e) => {
                warn!(task_id = %task.task_id, error = %e, "pipeline run ended in error");
                (e.terminal_status(), None, Some(e.to_string()), EventsSummary::default())
            }
        };

        let entry = HistoryEntry {
            timestamp: Utc::now(),
            task_id: task.task_id.clone(),
            status,
            pr_url,
            branch: Some(task.branch_name()),
            error,
            budget,
            events_summary,
        };

        if let Err(e) = self.history.record(&entry) {
            warn!(task_id = %task.task_id, error = %e, "failed to record history entry");
        }
        info!(task_id = %task.task_id, status = %entry.status, "pipeline run finished");
        entry
    }

    async fn drive(
        &self,
        task: &Task,
        workspace: &mut GitWorkspace,
        context_provider: &dyn ContextProvider,
        allow_core: bool,
    ) -> Result<RunOutcome, PipelineError> {
        workspace.create().await?;
        let worktree_path = workspace.worktree_path().to_path_buf();
        let sandbox = ShellSandbox::new(worktree_path.clone(), &self.config);

        let mut events = EventsSummary::default();
        let mut context = AgentContext::new(task.clone());
        if context_provider.available() {
            context.extra.prelude_prefix = Some(context_provider.build_prefix());
            context.task.constraints.extend(context_provider.constraints());
        }
        context.extra.repo_index_context = Some(self.indexer.index(&worktree_path).await?);
        context.extra.failure_context = self.history.build_failure_context(5);

        let mut protected_paths = self.config.boundaries.protected_paths.clone();
        protected_paths.extend(task.extra_protected_paths.iter().cloned());
        let boundary = PathPrefixBoundary::new(protected_paths.clone());
        context.extra.protected_paths = protected_paths;

        // Planner
        let (plan, _meta) = self.planner.run(&context).await?;
        if plan.is_empty() {
            return Ok(RunOutcome { status: TerminalStatus::PlanFailed, pr_url: None, events_summary: events });
        }
        events.plan_steps = Some(plan.steps.len());
        events.plan_risk = Some(format!("{:?}", plan.risk_level).to_lowercase());

        let violations = boundary.check_plan(&plan, allow_core);
        if !violations.is_empty() {
            if !allow_core {
                return Err(PipelineError::Boundary(violations));
            }
            warn!(task_id = %task.task_id, ?violations, "boundary violation overridden via allow_core");
        }

        if self.config.intervention.pause_after_plan && !self.config.intervention.auto_approve {
            let prompt = format!(
                "Approved plan for {}: {} step(s), risk={:?}. Proceed to implementation?",
                task.task_id,
                plan.steps.len(),
                plan.risk_level
            );
            if !self.confirmation.confirm(&prompt) {
                return Err(PipelineError::Interrupted);
            }
        }

        context.previous_output = StageState::Plan(plan);

        // Implementer
        let (mut implementation, _meta) = self.implementer.run(&context).await?;
        if implementation.is_empty() {
            return Ok(RunOutcome {
                status: TerminalStatus::ImplementationFailed,
                pr_url: None,
                events_summary: events,
            });
        }

        let violations = boundary.check(&implementation.all_files(), allow_core);
        if !violations.is_empty() {
            if !allow_core {
                return Err(PipelineError::Boundary(violations));
            }
            warn!(task_id = %task.task_id, ?violations, "boundary violation overridden via allow_core");
        }

        self.applicator.apply_changes(&worktree_path, &implementation.changes)?;
        self.applicator.apply_tests(&worktree_path, &implementation.tests_added)?;

        // Test/fix loop. No configured test command means the repo has no
        // way for us to judge correctness, so go straight to Security.
        let mut previous_fixes: Vec<String> = Vec::new();
        let mut tests_passed = true;
        let test_timeout = Duration::from_secs(self.config.limits.test_timeout_secs);

        if let Some(test_command) = self.config.limits.test_command.clone() {
            tests_passed = false;
            for attempt in 1..=self.config.limits.max_fix_attempts {
                let result = sandbox.execute(&test_command, test_timeout).await;
                if result.success() {
                    tests_passed = true;
                    events.tests_passed_on_attempt = Some(attempt);
                    break;
                }
                events.fix_attempts = Some(attempt);

                context.previous_output = StageState::Implementation(implementation.clone());
                context.extra.test_command = Some(test_command.clone());
                context.extra.error_output =
                    Some(truncate(&format!("{}\n{}", result.stdout, result.stderr), MAX_CAPTURED_OUTPUT));
                context.extra.attempt = Some(attempt);
                context.extra.previous_fixes = previous_fixes.clone();

                let (debug_result, _meta) = self.debugger.run(&context).await?;
                if debug_result.fix.is_empty() {
                    warn!(task_id = %task.task_id, attempt, "debugger produced no usable fix");
                    break;
                }

                let violations = boundary.check(&debug_result.fix.all_files(), allow_core);
                if !violations.is_empty() {
                    if !allow_core {
                        return Err(PipelineError::Boundary(violations));
                    }
                    warn!(task_id = %task.task_id, ?violations, "boundary violation overridden via allow_core");
                }

                self.applicator.apply_changes(&worktree_path, &debug_result.fix.changes)?;
                self.applicator.apply_tests(&worktree_path, &debug_result.fix.tests_added)?;
                previous_fixes.push(debug_result.diagnosis.clone());
                implementation = debug_result.fix;

                if !debug_result.should_retry {
                    break;
                }
            }
        }

        if !tests_passed {
            return Ok(RunOutcome { status: TerminalStatus::TestsFailed, pr_url: None, events_summary: events });
        }

        let diff_full = workspace.diff_full().await?;
        let diff_stat = workspace.diff_stat().await?;
        context.previous_output = StageState::Implementation(implementation.clone());
        context.extra.diff_full = Some(diff_full);
        context.extra.diff_stat = Some(diff_stat);

        // Security
        let (security_result, _meta) = self.security.run(&context).await?;
        events.security_verdict = Some(format!("{:?}", security_result.verdict).to_lowercase());
        if security_result.verdict == SecurityVerdict::Block {
            return Ok(RunOutcome { status: TerminalStatus::SecurityBlocked, pr_url: None, events_summary: events });
        }
        context.previous_output = StageState::Security(security_result);

        // Release
        let (release_result, _meta) = self.release.run(&context).await?;
        events.version_bump = Some(format!("{:?}", release_result.version_bump).to_lowercase());
        context.previous_output = StageState::Release(release_result.clone());

        // Archivist, ahead of the commit so any doc updates land in the same
        // commit as the change itself.
        let (archivist_result, _meta) = self.archivist.run(&context).await?;
        if archivist_result.should_write_adr || !archivist_result.doc_updates.is_empty() {
            apply_doc_updates(&worktree_path, &archivist_result);
        }

        let commit_message = if implementation.commit_message.trim().is_empty() {
            format!("glitchlab: {}", task.objective)
        } else {
            implementation.commit_message.clone()
        };
        workspace.commit(&commit_message).await?;

        if self.config.intervention.pause_before_pr && !self.config.intervention.auto_approve {
            let prompt = format!(
                "Ready to push {} and open a pull request (version bump: {:?}). Proceed?",
                task.branch_name(),
                release_result.version_bump
            );
            if !self.confirmation.confirm(&prompt) {
                return Ok(RunOutcome { status: TerminalStatus::PrCancelled, pr_url: None, events_summary: events });
            }
        }

        workspace.push().await?;
        let pr_creator = GhCliPrCreator::new(worktree_path, self.config.workspace.base_branch.clone());
        let title = format!("glitchlab: {}", task.objective);
        let pr_url = pr_creator
            .create(&task.branch_name(), &title, &release_result.changelog_entry)
            .await?;

        Ok(RunOutcome { status: TerminalStatus::PrCreated, pr_url: Some(pr_url), events_summary: events })
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &s[..end])
}

fn slugify(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let mut out = String::new();
    let mut last_dash = false;
    for c in slug.chars() {
        if c == '-' {
            if !last_dash {
                out.push(c);
            }
            last_dash = true;
        } else {
            out.push(c);
            last_dash = false;
        }
    }
    out.trim_matches('-').to_string()
}

fn apply_doc_updates(worktree_path: &Path, archivist: &ArchivistResult) {
    for update in &archivist.doc_updates {
        let target: PathBuf = worktree_path.join(&update.file);
        if let Some(parent) = target.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let result = match update.action {
            DocUpdateAction::Create | DocUpdateAction::Update => std::fs::write(&target, &update.content),
            DocUpdateAction::Append => {
                use std::io::Write as _;
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&target)
                    .and_then(|mut f| f.write_all(update.content.as_bytes()))
            }
        };
        if let Err(e) = result {
            warn!(file = %update.file, error = %e, "failed to apply archivist doc update");
        }
    }

    if let Some(adr) = &archivist.adr {
        let adr_path = worktree_path.join(format!("docs/adr/{}.md", slugify(&adr.title)));
        if let Some(parent) = adr_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let body = format!(
            "# {}\n\nStatus: {}\n\n## Context\n{}\n\n## Decision\n{}\n\n## Consequences\n{}\n",
            adr.title, adr.status, adr.context, adr.decision, adr.consequences
        );
        if let Err(e) = std::fs::write(&adr_path, body) {
            warn!(error = %e, "failed to write ADR");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries_and_appends_marker() {
        let s = "x".repeat(10);
        let out = truncate(&s, 5);
        assert!(out.starts_with("xxxxx"));
        assert!(out.ends_with("(truncated)"));
    }

    #[test]
    fn truncate_is_noop_under_the_limit() {
        assert_eq!(truncate("short", 100), "short");
    }

    #[test]
    fn slugify_collapses_non_alnum_runs() {
        assert_eq!(slugify("Use SQLite for Cache!!"), "use-sqlite-for-cache");
    }
}
