//! Shared JSON-extraction plumbing for agent adapters.
//!
//! LLMs asked for JSON still wrap it in prose or markdown fences often
//! enough that every adapter needs the same recovery path: strip fences,
//! fall back to the widest `{...}` span, parse, and if that still fails
//! hand the caller a typed fallback rather than aborting the pipeline.

use crate::domain::models::AgentContext;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Renders the parts of an `AgentContext` every role shares: any context
/// provider prefix, recent-failure history, and the task's constraints.
/// Role-specific fields (diff, error output, ...) are appended by the
/// caller after this block.
#[must_use]
pub fn context_preamble(context: &AgentContext) -> String {
    let mut out = String::new();
    if let Some(prefix) = &context.extra.prelude_prefix {
        out.push_str(prefix);
        out.push('\n');
    }
    if let Some(failures) = &context.extra.failure_context {
        out.push_str(failures);
        out.push('\n');
    }
    if let Some(index) = &context.extra.repo_index_context {
        out.push_str(index);
        out.push('\n');
    }
    out.push_str(&format!("Task objective: {}\n", context.task.objective));
    if !context.task.constraints.is_empty() {
        out.push_str("Constraints:\n");
        for c in &context.task.constraints {
            out.push_str(&format!("- {c}\n"));
        }
    }
    out
}

/// Extracts the most plausible JSON object from free-form LLM text.
pub fn extract_json(response: &str) -> String {
    let trimmed = response.trim();

    if let Some(rest) = trimmed.strip_prefix("```json") {
        if let Some(end) = rest.rfind("```") {
            return rest[..end].trim().to_string();
        }
    }

    if let Some(rest) = trimmed.strip_prefix("```") {
        if let Some(end) = rest.rfind("```") {
            return rest[..end].trim().to_string();
        }
    }

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return trimmed.to_string();
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            return trimmed[start..=end].to_string();
        }
    }

    trimmed.to_string()
}

/// Parses `response` as `T`; on any failure, logs the reason and returns
/// `fallback()` instead of propagating a pipeline-ending error. The caller
/// is responsible for marking the fallback's `parse_error` field so
/// downstream stages know the result is synthetic.
pub fn parse_or_fallback<T: DeserializeOwned>(response: &str, role: &str, fallback: impl FnOnce() -> T) -> T {
    let candidate = extract_json(response);
    match serde_json::from_str::<T>(&candidate) {
        Ok(value) => value,
        Err(err) => {
            let preview: String = response.chars().take(200).collect();
            warn!(role, error = %err, raw = %preview, "agent response failed to parse as JSON, using fallback");
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, PartialEq, Debug)]
    struct Demo {
        ok: bool,
    }

    #[test]
    fn extract_json_strips_fenced_blocks() {
        assert_eq!(extract_json("```json\n{\"ok\":true}\n```"), "{\"ok\":true}");
        assert_eq!(extract_json("```\n{\"ok\":true}\n```"), "{\"ok\":true}");
    }

    #[test]
    fn extract_json_finds_braces_in_prose() {
        assert_eq!(extract_json("here is the plan: {\"ok\":true} thanks"), "{\"ok\":true}");
    }

    #[test]
    fn parse_or_fallback_uses_fallback_on_malformed_json() {
        let result = parse_or_fallback("not json at all", "planner", || Demo { ok: false });
        assert_eq!(result, Demo { ok: false });
    }

    #[test]
    fn parse_or_fallback_parses_valid_json() {
        let result = parse_or_fallback("{\"ok\":true}", "planner", || Demo { ok: false });
        assert_eq!(result, Demo { ok: true });
    }
}
