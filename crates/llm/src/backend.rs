//! Chat-completion providers
//!
//! Both supported providers speak the OpenAI-compatible `/chat/completions`
//! wire format. They share the HTTP plumbing in [`CompatClient`] and differ
//! only in how they shape the request (sampling parameters).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use jinny_config::constants::providers;
use jinny_config::{ModelDescriptor, ProviderConfig, ProviderKind};
use jinny_core::Turn;

use crate::CompletionError;

/// A `{role, content}` pair as sent to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }
    }
}

/// Provider-independent completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatRequest {
    /// Strip a history down to `{role, content}` and attach the model parameters
    pub fn from_history(history: &[Turn], descriptor: &ModelDescriptor) -> Self {
        Self {
            model: descriptor.id.clone(),
            messages: history.iter().map(ChatMessage::from).collect(),
            max_tokens: descriptor.max_tokens,
            temperature: descriptor.temperature,
        }
    }
}

/// One implementation per provider family
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider family served
    fn kind(&self) -> ProviderKind;

    /// Issue exactly one completion request and return the first choice's text
    async fn complete(&self, request: ChatRequest) -> Result<String, CompletionError>;
}

/// HTTP plumbing shared by OpenAI-compatible endpoints
struct CompatClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl CompatClient {
    fn new(kind: ProviderKind, config: &ProviderConfig) -> Result<Self, CompletionError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                CompletionError::UpstreamError(format!("provider not configured: {}", kind))
            })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CompletionError::UpstreamError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    async fn post(&self, request: &OpenAIChatRequest) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CompletionError::from_status(status, &error_text));
        }

        let body = response.text().await?;
        parse_completion(&body)
    }
}

/// Extract the first choice's content from a response body
pub(crate) fn parse_completion(body: &str) -> Result<String, CompletionError> {
    let response: OpenAIChatResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::InvalidResponseShape(e.to_string()))?;

    if let Some(usage) = &response.usage {
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Completion usage"
        );
    }

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::InvalidResponseShape("No choices in response".to_string()))?;

    choice
        .message
        .content
        .ok_or_else(|| CompletionError::InvalidResponseShape("Choice has no content".to_string()))
}

/// OpenAI chat completions
pub struct OpenAiProvider {
    http: CompatClient,
}

impl OpenAiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, CompletionError> {
        Ok(Self {
            http: CompatClient::new(ProviderKind::OpenAi, config)?,
        })
    }

    fn build_request(request: ChatRequest) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: request.model,
            messages: request.messages,
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
            top_p: Some(providers::OPENAI_TOP_P),
            presence_penalty: Some(providers::OPENAI_PRESENCE_PENALTY),
            frequency_penalty: Some(providers::OPENAI_FREQUENCY_PENALTY),
            stream: Some(false),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, CompletionError> {
        self.http.post(&Self::build_request(request)).await
    }
}

/// Groq's OpenAI-compatible endpoint
pub struct GroqProvider {
    http: CompatClient,
}

impl GroqProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, CompletionError> {
        Ok(Self {
            http: CompatClient::new(ProviderKind::Groq, config)?,
        })
    }

    fn build_request(request: ChatRequest) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: request.model,
            messages: request.messages,
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
            top_p: Some(providers::GROQ_TOP_P),
            presence_penalty: None,
            frequency_penalty: None,
            stream: Some(false),
        }
    }
}

#[async_trait]
impl ChatProvider for GroqProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, CompletionError> {
        self.http.post(&Self::build_request(request)).await
    }
}

// OpenAI-compatible API types
#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use jinny_core::Turn;

    fn request() -> ChatRequest {
        let history = vec![Turn::system("You are Jinny"), Turn::user("hi")];
        let descriptor = ModelDescriptor::new("gpt-4", ProviderKind::OpenAi, 4000, 0.7);
        ChatRequest::from_history(&history, &descriptor)
    }

    #[test]
    fn test_history_stripped_to_role_and_content() {
        let request = request();
        assert_eq!(request.model, "gpt-4");
        assert_eq!(request.max_tokens, 4000);
        assert_eq!(
            request.messages[1],
            ChatMessage {
                role: "user".to_string(),
                content: "hi".to_string()
            }
        );
        let json = serde_json::to_value(&request.messages[0]).unwrap();
        assert!(json.get("timestamp").is_none());
    }

    #[test]
    fn test_openai_request_shape() {
        let json = serde_json::to_value(OpenAiProvider::build_request(request())).unwrap();
        assert_eq!(json["max_tokens"], 4000);
        assert_eq!(json["stream"], false);
        assert!((json["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert!((json["presence_penalty"].as_f64().unwrap() - 0.6).abs() < 1e-6);
        assert!((json["frequency_penalty"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_groq_request_shape() {
        let json = serde_json::to_value(GroqProvider::build_request(request())).unwrap();
        assert_eq!(json["top_p"], 1.0);
        assert_eq!(json["stream"], false);
        assert!(json.get("presence_penalty").is_none());
        assert!(json.get("frequency_penalty").is_none());
    }

    #[test]
    fn test_parse_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hello!"}},{"message":{"content":"other"}}],"usage":{"prompt_tokens":5,"completion_tokens":2,"total_tokens":7}}"#;
        assert_eq!(parse_completion(body).unwrap(), "Hello!");
    }

    #[test]
    fn test_parse_invalid_shapes() {
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(CompletionError::InvalidResponseShape(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"choices":[{"message":{"role":"assistant"}}]}"#),
            Err(CompletionError::InvalidResponseShape(_))
        ));
        assert!(matches!(
            parse_completion("<html>bad gateway</html>"),
            Err(CompletionError::InvalidResponseShape(_))
        ));
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        let config = ProviderConfig::new(providers::GROQ_ENDPOINT);
        match GroqProvider::new(&config) {
            Err(CompletionError::UpstreamError(msg)) => assert!(msg.contains("not configured")),
            _ => panic!("expected UpstreamError"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let mut config = ProviderConfig::new("http://127.0.0.1:9");
        config.api_key = Some("test-key".to_string());
        let provider = OpenAiProvider::new(&config).unwrap();

        let err = provider.complete(request()).await.unwrap_err();
        assert!(matches!(err, CompletionError::ServiceUnreachable(_)), "{:?}", err);
    }
}
