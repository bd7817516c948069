//! The LLM transport and per-role agent adapter ports.

use crate::domain::error::PipelineError;
use crate::domain::models::{AgentContext, AgentMeta};
use async_trait::async_trait;

/// A single LLM call, independent of provider or role.
#[async_trait]
pub trait Router: Send + Sync {
    /// Issue a JSON-mode chat completion. Returns the raw response text
    /// alongside usage metadata. The router itself enforces the budget
    /// ceiling: it must check the estimated cost against remaining headroom
    /// and return `PipelineError::BudgetExceeded` *before* making the call,
    /// never after.
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<(String, AgentMeta), PipelineError>;
}

/// One pipeline role's request/response contract over a `Router`.
///
/// Implementations build role-specific messages from an `AgentContext`,
/// then parse the router's raw text into a typed result, falling back to a
/// role-specific "parse failed" value (flagged `parse_error: true`) rather
/// than propagating a parse error — a malformed LLM response is data, not a
/// pipeline fault.
#[async_trait]
pub trait AgentAdapter: Send + Sync {
    type Output;

    fn role(&self) -> &'static str;

    async fn run(&self, context: &AgentContext) -> Result<(Self::Output, AgentMeta), PipelineError>;
}
