//! Chat-completion integration
//!
//! Features:
//! - Static model catalog with default fallback ([`ModelRegistry`])
//! - One [`ChatProvider`] per provider family (OpenAI, Groq)
//! - [`CompletionGateway`] routing a history to the right provider
//! - Failure classification with user-facing wording

pub mod backend;
pub mod factory;
pub mod gateway;
pub mod registry;

pub use backend::{ChatMessage, ChatProvider, ChatRequest, GroqProvider, OpenAiProvider};
pub use factory::ProviderFactory;
pub use gateway::CompletionGateway;
pub use registry::ModelRegistry;

use thiserror::Error;

/// Completion failures, classified for the user
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    /// Provider answered 429
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Connection refused, DNS failure or request timeout
    #[error("Service unreachable: {0}")]
    ServiceUnreachable(String),

    /// Any other non-2xx or transport failure
    #[error("Upstream error: {0}")]
    UpstreamError(String),

    /// Body could not be parsed, or no usable choice
    #[error("Invalid response shape: {0}")]
    InvalidResponseShape(String),
}

impl CompletionError {
    /// Wording shown to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            CompletionError::RateLimited(_) => "Rate limit exceeded. Please try again in a moment.",
            CompletionError::ServiceUnreachable(_) => {
                "Unable to connect to AI service. Please try again later."
            },
            CompletionError::UpstreamError(_) | CompletionError::InvalidResponseShape(_) => {
                "An error occurred while processing your request."
            },
        }
    }

    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::RateLimited(_) => "rate_limited",
            CompletionError::ServiceUnreachable(_) => "unreachable",
            CompletionError::UpstreamError(_) => "upstream",
            CompletionError::InvalidResponseShape(_) => "invalid_response",
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = format!("HTTP {}: {}", status, body);
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            CompletionError::RateLimited(detail)
        } else {
            CompletionError::UpstreamError(detail)
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            CompletionError::ServiceUnreachable(err.to_string())
        } else if err.is_decode() {
            CompletionError::InvalidResponseShape(err.to_string())
        } else if err.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            CompletionError::RateLimited(err.to_string())
        } else {
            CompletionError::UpstreamError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_classification() {
        let err = CompletionError::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(err, CompletionError::RateLimited(_)));
        assert_eq!(
            err.user_message(),
            "Rate limit exceeded. Please try again in a moment."
        );

        let err = CompletionError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, CompletionError::UpstreamError(_)));
        assert!(err.to_string().contains("boom"));
        assert_eq!(
            err.user_message(),
            "An error occurred while processing your request."
        );
    }

    #[test]
    fn test_user_wording() {
        assert_eq!(
            CompletionError::ServiceUnreachable("refused".into()).user_message(),
            "Unable to connect to AI service. Please try again later."
        );
        assert_eq!(
            CompletionError::InvalidResponseShape("no choices".into()).user_message(),
            "An error occurred while processing your request."
        );
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(CompletionError::RateLimited(String::new()).kind(), "rate_limited");
        assert_eq!(CompletionError::UpstreamError(String::new()).kind(), "upstream");
    }
}
