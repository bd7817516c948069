use async_trait::async_trait;
use std::sync::Arc;

use super::common::{context_preamble, parse_or_fallback};
use crate::domain::error::PipelineError;
use crate::domain::models::{AgentContext, AgentMeta, DependencyChanges, SecurityResult, SecurityVerdict};
use crate::domain::ports::{AgentAdapter, Router};

const SYSTEM_PROMPT: &str = r#"You are the security review stage of an automated code-change pipeline.
Review the full diff of the proposed change for injected secrets, unsafe shell/SQL construction,
unreviewed dependency additions, and any attempt to touch a protected path. Respond as JSON, matching
exactly:
{"verdict":"pass"|"warn"|"block",
 "issues":[{"severity":"low"|"medium"|"high"|"critical","file":"...","line":null,
   "description":"...","recommendation":"..."}],
 "dependency_changes":{"added":["..."],"removed":["..."],"risk_assessment":"..."},
 "boundary_violations":["..."],"summary":"..."}
Use "block" for any critical-severity issue or a protected-path violation. Do not include prose
outside the JSON object."#;

/// Reviews the full diff for injected secrets, unsafe constructs, and
/// dependency or boundary risk before a commit is made.
pub struct SecurityAdapter {
    router: Arc<dyn Router>,
}

impl SecurityAdapter {
    #[must_use]
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl AgentAdapter for SecurityAdapter {
    type Output = SecurityResult;

    fn role(&self) -> &'static str {
        "security"
    }

    async fn run(&self, context: &AgentContext) -> Result<(SecurityResult, AgentMeta), PipelineError> {
        let mut user_prompt = context_preamble(context);
        if let Some(diff) = &context.extra.diff_full {
            user_prompt.push_str("\nFull diff:\n");
            user_prompt.push_str(diff);
        }
        if !context.extra.protected_paths.is_empty() {
            user_prompt.push_str("\nProtected paths for this run:\n");
            for p in &context.extra.protected_paths {
                user_prompt.push_str(&format!("- {p}\n"));
            }
        }

        let (raw, meta) = self.router.complete_json(SYSTEM_PROMPT, &user_prompt).await?;
        let result = parse_or_fallback(&raw, self.role(), || SecurityResult {
            verdict: SecurityVerdict::Block,
            issues: Vec::new(),
            dependency_changes: DependencyChanges::default(),
            boundary_violations: Vec::new(),
            summary: "security response could not be parsed; blocking conservatively".to_string(),
            parse_error: true,
        });
        Ok((result, meta))
    }
}
