use async_trait::async_trait;
use std::sync::Arc;

use super::common::{context_preamble, parse_or_fallback};
use crate::domain::error::PipelineError;
use crate::domain::models::{AgentContext, AgentMeta, ArchivistResult};
use crate::domain::ports::{AgentAdapter, Router};

const SYSTEM_PROMPT: &str = r#"You are the archivist stage of an automated code-change pipeline,
run last, after a commit is made. Decide whether this change is significant enough to warrant an
architecture decision record, and draft any documentation updates. Respond as JSON, matching
exactly:
{"adr":{"title":"...","status":"proposed","context":"...","decision":"...","consequences":"...",
  "alternatives_considered":["..."]} | null,
 "doc_updates":[{"file":"...","action":"create"|"append"|"update","content":"...","description":"..."}],
 "architecture_notes":"...","should_write_adr":true|false}
Set "should_write_adr" to false and "adr" to null for routine changes. Do not include prose outside
the JSON object."#;

/// Decides whether a completed change warrants an ADR and drafts any
/// documentation updates.
pub struct ArchivistAdapter {
    router: Arc<dyn Router>,
}

impl ArchivistAdapter {
    #[must_use]
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl AgentAdapter for ArchivistAdapter {
    type Output = ArchivistResult;

    fn role(&self) -> &'static str {
        "archivist"
    }

    async fn run(&self, context: &AgentContext) -> Result<(ArchivistResult, AgentMeta), PipelineError> {
        let user_prompt = context_preamble(context);
        let (raw, meta) = self.router.complete_json(SYSTEM_PROMPT, &user_prompt).await?;
        let result = parse_or_fallback(&raw, self.role(), || ArchivistResult {
            adr: None,
            doc_updates: Vec::new(),
            architecture_notes: "archivist response could not be parsed".to_string(),
            should_write_adr: false,
            parse_error: true,
        });
        Ok((result, meta))
    }
}
