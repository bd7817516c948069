use async_trait::async_trait;
use std::sync::Arc;

use super::common::{context_preamble, parse_or_fallback};
use crate::domain::error::PipelineError;
use crate::domain::models::{AgentContext, AgentMeta, ImplementationResult, StageState};
use crate::domain::ports::{AgentAdapter, Router};

const SYSTEM_PROMPT: &str = r#"You are the implementation stage of an automated code-change pipeline.
You receive an approved plan and must produce the actual file changes as JSON, matching exactly:
{"changes":[{"file":"...","description":"...",
  "action":"create","content":"..."} |
  {"file":"...","description":"...","action":"delete"} |
  {"file":"...","description":"...","action":"modify",
   "surgical":[{"search":"...","replace":"..."}],"patch":"... unified diff ...","content":"..."}],
 "tests_added":[{"file":"...","content":"...","description":"..."}],
 "commit_message":"...","summary":"..."}
For "modify", prefer "surgical" search/replace blocks over "patch" or full "content" — each search
string must appear exactly once in the current file. Only fall back to "patch" (a unified diff) or
full "content" when a surgical block cannot express the change. Do not include prose outside the
JSON object."#;

/// Turns an approved `Plan` into concrete `FileChange`s.
pub struct ImplementerAdapter {
    router: Arc<dyn Router>,
}

impl ImplementerAdapter {
    #[must_use]
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl AgentAdapter for ImplementerAdapter {
    type Output = ImplementationResult;

    fn role(&self) -> &'static str {
        "implementer"
    }

    async fn run(&self, context: &AgentContext) -> Result<(ImplementationResult, AgentMeta), PipelineError> {
        let mut user_prompt = context_preamble(context);
        if let StageState::Plan(plan) = &context.previous_output {
            user_prompt.push_str("\nApproved plan:\n");
            user_prompt.push_str(&serde_json::to_string_pretty(plan).unwrap_or_default());
        }

        let (raw, meta) = self.router.complete_json(SYSTEM_PROMPT, &user_prompt).await?;
        let result = parse_or_fallback(&raw, self.role(), || ImplementationResult {
            changes: Vec::new(),
            tests_added: Vec::new(),
            commit_message: String::new(),
            summary: String::new(),
            parse_error: true,
        });
        Ok((result, meta))
    }
}
