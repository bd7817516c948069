use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the Anthropic Messages API transport.
#[derive(Error, Debug, Clone)]
pub enum AnthropicApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid API key")]
    InvalidApiKey,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("server error ({0}): {1}")]
    ServerError(StatusCode, String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("unknown error ({0}): {1}")]
    UnknownError(StatusCode, String),
}

impl AnthropicApiError {
    #[must_use]
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            400 => Self::InvalidRequest(body),
            401 => Self::InvalidApiKey,
            403 => Self::Forbidden(body),
            429 => Self::RateLimitExceeded,
            500 | 502 | 503 | 504 | 529 => Self::ServerError(status, body),
            _ => Self::UnknownError(status, body),
        }
    }

    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimitExceeded | Self::ServerError(_, _) | Self::NetworkError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_client_errors_as_permanent() {
        let err = AnthropicApiError::from_status(StatusCode::UNAUTHORIZED, String::new());
        assert!(matches!(err, AnthropicApiError::InvalidApiKey));
        assert!(!err.is_transient());
    }

    #[test]
    fn classifies_server_and_rate_limit_errors_as_transient() {
        assert!(AnthropicApiError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()).is_transient());
        assert!(AnthropicApiError::from_status(StatusCode::BAD_GATEWAY, String::new()).is_transient());
        assert!(AnthropicApiError::from_status(StatusCode::from_u16(529).unwrap(), String::new()).is_transient());
    }
}
