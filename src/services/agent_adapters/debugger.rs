use async_trait::async_trait;
use std::sync::Arc;

use super::common::{context_preamble, parse_or_fallback};
use crate::domain::error::PipelineError;
use crate::domain::models::{AgentContext, AgentMeta, DebugResult, ImplementationResult};
use crate::domain::ports::{AgentAdapter, Router};

const SYSTEM_PROMPT: &str = r#"You are the debugging stage of an automated code-change pipeline.
A test command failed after the implementer's changes were applied. Given the failing command, its
captured output, and any previous fix attempts that did not work, diagnose the failure and propose a
fix as JSON, matching exactly:
{"diagnosis":"...","root_cause":"...",
 "fix":{"changes":[...same shape as the implementer's "changes"...],"tests_added":[...],
   "commit_message":"...","summary":"..."},
 "confidence":"low"|"medium"|"high","should_retry":true|false,"notes":"..."}
Set "should_retry" to false only if you believe no further automated fix attempt would help.
Do not repeat a previous fix attempt verbatim. Do not include prose outside the JSON object."#;

/// Diagnoses a failing test run and proposes a fix, one iteration of the
/// test/fix loop.
pub struct DebuggerAdapter {
    router: Arc<dyn Router>,
}

impl DebuggerAdapter {
    #[must_use]
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl AgentAdapter for DebuggerAdapter {
    type Output = DebugResult;

    fn role(&self) -> &'static str {
        "debugger"
    }

    async fn run(&self, context: &AgentContext) -> Result<(DebugResult, AgentMeta), PipelineError> {
        let mut user_prompt = context_preamble(context);
        if let Some(cmd) = &context.extra.test_command {
            user_prompt.push_str(&format!("\nFailing test command: {cmd}\n"));
        }
        if let Some(output) = &context.extra.error_output {
            user_prompt.push_str(&format!("Captured output:\n{output}\n"));
        }
        if let Some(attempt) = context.extra.attempt {
            user_prompt.push_str(&format!("This is fix attempt #{attempt}.\n"));
        }
        if !context.extra.previous_fixes.is_empty() {
            user_prompt.push_str("Previous fix attempts that did not resolve the failure:\n");
            for (i, fix) in context.extra.previous_fixes.iter().enumerate() {
                user_prompt.push_str(&format!("Attempt {}: {fix}\n", i + 1));
            }
        }

        let (raw, meta) = self.router.complete_json(SYSTEM_PROMPT, &user_prompt).await?;
        let result = parse_or_fallback(&raw, self.role(), || DebugResult {
            diagnosis: String::new(),
            root_cause: String::new(),
            fix: ImplementationResult {
                changes: Vec::new(),
                tests_added: Vec::new(),
                commit_message: String::new(),
                summary: String::new(),
                parse_error: true,
            },
            confidence: "low".to_string(),
            should_retry: false,
            notes: "debugger response could not be parsed".to_string(),
            parse_error: true,
        });
        Ok((result, meta))
    }
}
