use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use super::common::{context_preamble, parse_or_fallback};
use crate::domain::error::PipelineError;
use crate::domain::models::{AgentContext, AgentMeta, Plan, RiskLevel};
use crate::domain::ports::{AgentAdapter, Router};

const SYSTEM_PROMPT: &str = r#"You are the planning stage of an automated code-change pipeline.
Given a task objective and repository context, produce a JSON object describing the steps needed,
matching exactly:
{"steps":[{"description":"...","action":"modify"|"create"|"delete","files":["..."]}],
 "risk_level":"low"|"medium"|"high"|"unknown","risk_notes":"...","estimated_complexity":"...",
 "files_likely_affected":["..."]}
Every step must name at least one file. Do not include prose outside the JSON object."#;

/// Turns a task objective into an ordered list of file-level steps.
pub struct PlannerAdapter {
    router: Arc<dyn Router>,
}

impl PlannerAdapter {
    #[must_use]
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl AgentAdapter for PlannerAdapter {
    type Output = Plan;

    fn role(&self) -> &'static str {
        "planner"
    }

    async fn run(&self, context: &AgentContext) -> Result<(Plan, AgentMeta), PipelineError> {
        let user_prompt = context_preamble(context);
        let (raw, meta) = self.router.complete_json(SYSTEM_PROMPT, &user_prompt).await?;
        let fallback = || Plan {
            steps: Vec::new(),
            risk_level: RiskLevel::Unknown,
            risk_notes: String::new(),
            estimated_complexity: String::new(),
            files_likely_affected: Vec::new(),
            parse_error: true,
        };
        let plan = parse_or_fallback(&raw, self.role(), fallback);
        let plan = if plan.parse_error || plan.validate() {
            plan
        } else {
            warn!(role = self.role(), "plan violated planner policy (empty step files or >2 files), using fallback");
            fallback()
        };
        Ok((plan, meta))
    }
}
