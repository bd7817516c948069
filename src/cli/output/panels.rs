//! Single-run outcome panel, printed after `glitchlab run` finishes.

use console::{style, Style};

use crate::domain::error::TerminalStatus;
use crate::domain::models::HistoryEntry;

fn status_style(status: TerminalStatus) -> Style {
    match status {
        TerminalStatus::PrCreated | TerminalStatus::Committed => Style::new().green().bold(),
        TerminalStatus::PlanFailed
        | TerminalStatus::ImplementationFailed
        | TerminalStatus::TestsFailed
        | TerminalStatus::Error => Style::new().red().bold(),
        TerminalStatus::BoundaryViolation | TerminalStatus::SecurityBlocked => Style::new().magenta().bold(),
        TerminalStatus::PrCancelled | TerminalStatus::Interrupted => Style::new().yellow(),
        TerminalStatus::BudgetExceeded => Style::new().yellow().bold(),
    }
}

fn label(name: &str) -> String {
    format!("{}{}", style(name).bold(), style(":").dim())
}

/// Renders a finished run as a boxed summary for the terminal. Falls back to
/// plain text automatically when the output isn't a tty (`console` checks
/// `NO_COLOR`/`TERM` the same way as the rest of the corpus).
#[must_use]
pub fn render_run_outcome(entry: &HistoryEntry) -> String {
    let mut lines = Vec::new();
    let heading = status_style(entry.status).apply_to(entry.status.to_string());
    lines.push(format!("{} {}", label("task"), entry.task_id));
    lines.push(format!("{} {}", label("status"), heading));

    if let Some(branch) = &entry.branch {
        lines.push(format!("{} {}", label("branch"), branch));
    }
    if let Some(pr_url) = &entry.pr_url {
        lines.push(format!("{} {}", label("pull request"), style(pr_url).underlined()));
    }
    if let Some(error) = &entry.error {
        lines.push(format!("{} {}", label("error"), style(error).red()));
    }

    let summary = &entry.events_summary;
    if let Some(steps) = summary.plan_steps {
        let risk = summary.plan_risk.as_deref().unwrap_or("unknown");
        lines.push(format!("{} {steps} step(s), risk={risk}", label("plan")));
    }
    if let Some(attempt) = summary.tests_passed_on_attempt {
        lines.push(format!("{} passed on attempt {attempt}", label("tests")));
    } else if let Some(attempts) = summary.fix_attempts {
        lines.push(format!("{} did not pass after {attempts} fix attempt(s)", label("tests")));
    }
    if let Some(verdict) = &summary.security_verdict {
        lines.push(format!("{} {verdict}", label("security")));
    }
    if let Some(bump) = &summary.version_bump {
        lines.push(format!("{} {bump}", label("version")));
    }

    lines.push(format!(
        "{} {} tokens, ${:.4}, {} call(s)",
        label("budget"),
        entry.budget.tokens_used,
        entry.budget.cost_used,
        entry.budget.calls_made
    ));

    let width = lines.iter().map(|l| console::measure_text_width(l)).max().unwrap_or(0).max(20);
    let border = "─".repeat(width + 2);
    let mut out = format!("╭{border}╮\n");
    for line in &lines {
        let pad = width - console::measure_text_width(line);
        out.push_str(&format!("│ {line}{} │\n", " ".repeat(pad)));
    }
    out.push_str(&format!("╰{border}╯"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{BudgetState, EventsSummary};

    fn entry() -> HistoryEntry {
        HistoryEntry {
            timestamp: chrono::Utc::now(),
            task_id: "fix-flaky-test".to_string(),
            status: TerminalStatus::PrCreated,
            pr_url: Some("https://example.com/pr/9".to_string()),
            branch: Some("glitchlab/fix-flaky-test".to_string()),
            error: None,
            budget: BudgetState { tokens_used: 5000, cost_used: 0.12, calls_made: 6 },
            events_summary: EventsSummary {
                plan_steps: Some(3),
                plan_risk: Some("low".to_string()),
                tests_passed_on_attempt: Some(1),
                security_verdict: Some("allow".to_string()),
                version_bump: Some("patch".to_string()),
                fix_attempts: None,
            },
        }
    }

    #[test]
    fn panel_includes_task_and_pr_url() {
        let rendered = render_run_outcome(&entry());
        assert!(rendered.contains("fix-flaky-test"));
        assert!(rendered.contains("pr/9"));
        assert!(rendered.contains("pr_created"));
    }

    #[test]
    fn panel_renders_a_closed_box() {
        let rendered = render_run_outcome(&entry());
        assert!(rendered.starts_with('╭'));
        assert!(rendered.trim_end().ends_with('╯'));
    }
}
