use async_trait::async_trait;
use std::sync::Arc;

use super::common::{context_preamble, parse_or_fallback};
use crate::domain::error::PipelineError;
use crate::domain::models::{AgentContext, AgentMeta, ReleaseResult, VersionBump};
use crate::domain::ports::{AgentAdapter, Router};

const SYSTEM_PROMPT: &str = r#"You are the release stage of an automated code-change pipeline.
Given a diff summary, decide the semantic version impact and draft a changelog entry. Respond as
JSON, matching exactly:
{"version_bump":"none"|"patch"|"minor"|"major","reasoning":"...","changelog_entry":"...",
 "breaking_changes":["..."],"migration_notes":"...","risk_summary":"..."}
Do not include prose outside the JSON object."#;

/// Decides the semantic-version impact of an approved change and drafts a
/// changelog entry.
pub struct ReleaseAdapter {
    router: Arc<dyn Router>,
}

impl ReleaseAdapter {
    #[must_use]
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl AgentAdapter for ReleaseAdapter {
    type Output = ReleaseResult;

    fn role(&self) -> &'static str {
        "release"
    }

    async fn run(&self, context: &AgentContext) -> Result<(ReleaseResult, AgentMeta), PipelineError> {
        let mut user_prompt = context_preamble(context);
        if let Some(stat) = &context.extra.diff_stat {
            user_prompt.push_str("\nDiff stat:\n");
            user_prompt.push_str(stat);
        }

        let (raw, meta) = self.router.complete_json(SYSTEM_PROMPT, &user_prompt).await?;
        let result = parse_or_fallback(&raw, self.role(), || ReleaseResult {
            version_bump: VersionBump::None,
            reasoning: "release response could not be parsed".to_string(),
            changelog_entry: String::new(),
            breaking_changes: Vec::new(),
            migration_notes: String::new(),
            risk_summary: String::new(),
            parse_error: true,
        });
        Ok((result, meta))
    }
}
