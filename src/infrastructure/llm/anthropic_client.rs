use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::sleep;

use super::error::AnthropicApiError;
use super::rate_limiter::GovernedRateLimiter;
use super::types::{Message, MessageRequest, MessageResponse};
use super::LlmTransport;
use crate::domain::error::PipelineError;
use crate::domain::models::AgentMeta;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Live HTTP transport to the Anthropic Messages API.
///
/// Rate limiting paces requests; a small exponential backoff absorbs
/// transient 429/5xx responses. Neither retries authentication or
/// malformed-request errors — those are caller bugs, not hiccups.
pub struct AnthropicTransport {
    http: ReqwestClient,
    api_key: String,
    base_url: String,
    model: String,
    rate_limiter: GovernedRateLimiter,
    cost_per_1k_tokens: BTreeMap<String, f64>,
    max_retries: u32,
}

impl AnthropicTransport {
    pub fn new(
        api_key: String,
        model: String,
        cost_per_1k_tokens: BTreeMap<String, f64>,
    ) -> anyhow::Result<Self> {
        let http = ReqwestClient::builder()
            .timeout(Duration::from_secs(300))
            .pool_max_idle_per_host(4)
            .build()
            .context("failed to build LLM HTTP client")?;
        Ok(Self {
            http,
            api_key,
            base_url: "https://api.anthropic.com".to_string(),
            model,
            rate_limiter: GovernedRateLimiter::per_second(4),
            cost_per_1k_tokens,
            max_retries: 3,
        })
    }

    fn cost_for(&self, tokens: u64) -> f64 {
        let rate = self
            .cost_per_1k_tokens
            .get(&self.model)
            .copied()
            .unwrap_or(0.003);
        (tokens as f64 / 1000.0) * rate
    }

    async fn send(&self, request: &MessageRequest) -> Result<MessageResponse, AnthropicApiError> {
        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| AnthropicApiError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnthropicApiError::from_status(status, body));
        }

        response
            .json::<MessageResponse>()
            .await
            .map_err(|e| AnthropicApiError::NetworkError(format!("failed to parse response: {e}")))
    }

    async fn send_with_retry(&self, request: &MessageRequest) -> Result<MessageResponse, AnthropicApiError> {
        let mut attempt = 0;
        loop {
            match self.send(request).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let backoff_ms = 500u64.saturating_mul(2u64.saturating_pow(attempt));
                    tracing::warn!(attempt, error = %err, "retrying LLM request after backoff");
                    sleep(Duration::from_millis(backoff_ms)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl LlmTransport for AnthropicTransport {
    async fn complete(&self, system: &str, user: &str) -> Result<(String, AgentMeta), PipelineError> {
        self.rate_limiter.acquire().await;

        let request = MessageRequest {
            model: self.model.clone(),
            messages: vec![Message { role: "user".to_string(), content: user.to_string() }],
            max_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            system: Some(system.to_string()),
        };

        let response = self
            .send_with_retry(&request)
            .await
            .map_err(|e| PipelineError::Other(format!("LLM transport error: {e}")))?;

        let tokens = response.total_tokens();
        let meta = AgentMeta {
            agent: "llm".to_string(),
            model: response.model.clone(),
            tokens,
            cost: self.cost_for(tokens),
        };
        Ok((response.text(), meta))
    }
}
