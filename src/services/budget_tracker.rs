//! Router: a hard pre-call budget ceiling wrapped around an LLM transport.
//!
//! Unlike a soft pressure-level throttle, a call that would exceed the
//! ceiling is rejected before it is made. The budget is not refunded and the
//! call is not retried — the provider is assumed to handle its own
//! transient-failure retries.

use crate::domain::error::PipelineError;
use crate::domain::models::{AgentMeta, BudgetCeiling, BudgetState};
use crate::domain::ports::Router;
use crate::infrastructure::llm::{estimate_tokens, LlmTransport};
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::{debug, warn};

pub struct BudgetedRouter {
    transport: Box<dyn LlmTransport>,
    ceiling: BudgetCeiling,
    cost_per_1k_tokens: f64,
    state: Mutex<BudgetState>,
}

impl BudgetedRouter {
    #[must_use]
    pub fn new(transport: Box<dyn LlmTransport>, ceiling: BudgetCeiling, cost_per_1k_tokens: f64) -> Self {
        Self {
            transport,
            ceiling,
            cost_per_1k_tokens,
            state: Mutex::new(BudgetState::default()),
        }
    }

    #[must_use]
    pub fn budget_state(&self) -> BudgetState {
        self.state.lock().expect("budget lock poisoned").clone()
    }
}

#[async_trait]
impl Router for BudgetedRouter {
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<(String, AgentMeta), PipelineError> {
        let estimated_tokens = estimate_tokens(system_prompt) + estimate_tokens(user_prompt);
        let estimated_cost = (estimated_tokens as f64 / 1000.0) * self.cost_per_1k_tokens;

        {
            let state = self.state.lock().expect("budget lock poisoned");
            if state.would_exceed(self.ceiling, estimated_tokens, estimated_cost) {
                warn!(
                    tokens_used = state.tokens_used,
                    cost_used = state.cost_used,
                    "rejecting router call: would exceed budget ceiling"
                );
                return Err(PipelineError::BudgetExceeded(format!(
                    "estimated {estimated_tokens} tokens / ${estimated_cost:.4} would exceed ceiling of {} tokens / ${:.2}",
                    self.ceiling.max_tokens, self.ceiling.max_cost
                )));
            }
        }

        let (text, meta) = self.transport.complete(system_prompt, user_prompt).await?;

        let mut state = self.state.lock().expect("budget lock poisoned");
        state.record(meta.tokens, meta.cost);
        debug!(tokens_used = state.tokens_used, cost_used = state.cost_used, "router call recorded");
        Ok((text, meta))
    }
}
