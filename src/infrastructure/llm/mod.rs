//! LLM transport: the HTTP boundary wrapped by `services::budget_tracker`.
//!
//! `LlmTransport` is the thin port; `BudgetedRouter` (in the services layer)
//! is what agent adapters actually call. Keeping the two separate means the
//! budget ceiling check never depends on any particular provider's wire
//! format.

pub mod anthropic_client;
pub mod error;
pub mod rate_limiter;
pub mod types;

pub use anthropic_client::AnthropicTransport;
pub use error::AnthropicApiError;
pub use rate_limiter::GovernedRateLimiter;

use crate::domain::error::PipelineError;
use crate::domain::models::AgentMeta;
use async_trait::async_trait;

/// A provider-specific channel for sending a system/user prompt pair and
/// getting back raw text plus accounting metadata. Implementations own
/// retries and rate limiting; they never enforce a budget ceiling
/// themselves — that's `BudgetedRouter`'s job.
#[async_trait]
pub trait LlmTransport: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<(String, AgentMeta), PipelineError>;
}

/// Rough token estimate used for the pre-call budget check, before the
/// provider has told us the real usage. Anthropic models average close to
/// 4 characters per token for English prose and code; this is intentionally
/// conservative (rounds up) since the cost of overestimating is a rejected
/// call, not a blown budget.
#[must_use]
pub fn estimate_tokens(text: &str) -> u64 {
    let chars = text.chars().count() as u64;
    chars.div_ceil(4).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_tokens_rounds_up_and_floors_at_one() {
        assert_eq!(estimate_tokens(""), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens(&"x".repeat(400)), 100);
    }
}
