//! History table formatting using `comfy-table`.

use crate::domain::error::TerminalStatus;
use crate::domain::models::{HistoryEntry, HistoryStats};
use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};

fn status_color(status: TerminalStatus) -> Color {
    match status {
        TerminalStatus::PrCreated | TerminalStatus::Committed => Color::Green,
        TerminalStatus::PlanFailed
        | TerminalStatus::ImplementationFailed
        | TerminalStatus::TestsFailed
        | TerminalStatus::Error => Color::Red,
        TerminalStatus::BoundaryViolation | TerminalStatus::SecurityBlocked => Color::Magenta,
        TerminalStatus::PrCancelled | TerminalStatus::Interrupted => Color::Yellow,
        TerminalStatus::BudgetExceeded => Color::DarkYellow,
    }
}

/// Renders a slice of history entries as a table, most recent first.
#[must_use]
pub fn format_history_table(entries: &[HistoryEntry], use_colors: bool) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Task").add_attribute(Attribute::Bold),
        Cell::new("Status").add_attribute(Attribute::Bold),
        Cell::new("When").add_attribute(Attribute::Bold),
        Cell::new("PR").add_attribute(Attribute::Bold),
        Cell::new("Tokens").add_attribute(Attribute::Bold),
        Cell::new("Cost").add_attribute(Attribute::Bold),
    ]);

    for entry in entries {
        let status_cell = if use_colors {
            Cell::new(entry.status.to_string()).fg(status_color(entry.status))
        } else {
            Cell::new(entry.status.to_string())
        };

        table.add_row(vec![
            Cell::new(truncate(&entry.task_id, 24)),
            status_cell,
            Cell::new(entry.timestamp.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(entry.pr_url.as_deref().unwrap_or("-")),
            Cell::new(entry.budget.tokens_used.to_string()),
            Cell::new(format!("${:.4}", entry.budget.cost_used)),
        ]);
    }

    table.to_string()
}

/// Renders aggregate history statistics as a two-column table.
#[must_use]
pub fn format_history_stats(stats: &HistoryStats) -> String {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    table.add_row(vec!["Total runs", &stats.total_runs.to_string()]);
    table.add_row(vec!["Success rate", &format!("{:.1}%", stats.success_rate * 100.0)]);
    table.add_row(vec!["Total tokens", &stats.total_tokens.to_string()]);
    table.add_row(vec!["Total cost", &format!("${:.2}", stats.total_cost)]);
    table.add_row(vec!["Avg cost/run", &format!("${:.4}", stats.avg_cost_per_run)]);
    for (status, count) in &stats.statuses {
        table.add_row(vec![format!("  {status}"), count.to_string()]);
    }

    table.to_string()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::BudgetState;

    fn entry() -> HistoryEntry {
        HistoryEntry {
            timestamp: chrono::Utc::now(),
            task_id: "t1".to_string(),
            status: TerminalStatus::PrCreated,
            pr_url: Some("https://example.com/pr/1".to_string()),
            branch: Some("glitchlab/t1".to_string()),
            error: None,
            budget: BudgetState { tokens_used: 1200, cost_used: 0.05, calls_made: 3 },
            events_summary: Default::default(),
        }
    }

    #[test]
    fn table_contains_task_and_pr_url() {
        let rendered = format_history_table(&[entry()], false);
        assert!(rendered.contains("t1"));
        assert!(rendered.contains("pr_created"));
        assert!(rendered.contains("pr/1"));
    }

    #[test]
    fn stats_table_renders_percentages() {
        let stats = HistoryStats {
            total_runs: 4,
            statuses: Default::default(),
            success_rate: 0.5,
            total_cost: 1.0,
            total_tokens: 1000,
            avg_cost_per_run: 0.25,
        };
        let rendered = format_history_stats(&stats);
        assert!(rendered.contains("50.0%"));
    }
}
