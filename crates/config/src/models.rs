//! Model catalog configuration

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MODEL_ID;

/// LLM provider family
///
/// Each provider has its own request shape and response parsing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions
    #[serde(alias = "open_ai")]
    OpenAi,
    /// Groq (OpenAI-compatible endpoint, different sampling)
    Groq,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Groq => "groq",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "open_ai" | "gpt" => Ok(ProviderKind::OpenAi),
            "groq" => Ok(ProviderKind::Groq),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Static description of one selectable LLM backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Stable key sent by clients
    pub id: String,
    /// Provider that serves this model
    pub provider: ProviderKind,
    /// Generation cap
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>, provider: ProviderKind, max_tokens: u32, temperature: f32) -> Self {
        Self {
            id: id.into(),
            provider,
            max_tokens,
            temperature,
        }
    }
}

/// Catalog shipped with the assistant
pub fn default_catalog() -> Vec<ModelDescriptor> {
    use ProviderKind::*;
    vec![
        ModelDescriptor::new("gpt-3.5-turbo-16k", OpenAi, 700, 0.7),
        ModelDescriptor::new("gpt-4", OpenAi, 4000, 0.7),
        ModelDescriptor::new("gpt-4-turbo", OpenAi, 4000, 0.7),
        ModelDescriptor::new(DEFAULT_MODEL_ID, Groq, 8192, 0.7),
        ModelDescriptor::new("meta-llama/llama-4-maverick-17b-128e-instruct", Groq, 8192, 0.7),
        ModelDescriptor::new("qwen-qwq-32b", Groq, 8192, 0.7),
        ModelDescriptor::new("mistral-saba-24b", Groq, 8192, 0.7),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("openai".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert_eq!("GROQ".parse::<ProviderKind>(), Ok(ProviderKind::Groq));
        assert!("anthropic".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_default_catalog_contains_default_model() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 7);
        let default = catalog.iter().find(|m| m.id == DEFAULT_MODEL_ID).unwrap();
        assert_eq!(default.provider, ProviderKind::Groq);
        assert_eq!(default.max_tokens, 8192);
    }

    #[test]
    fn test_descriptor_deserialize() {
        let raw = r#"{"id":"gpt-4","provider":"openai","max_tokens":4000,"temperature":0.7}"#;
        let descriptor: ModelDescriptor = serde_json::from_str(raw).unwrap();
        assert_eq!(descriptor.provider, ProviderKind::OpenAi);
        assert_eq!(descriptor.max_tokens, 4000);
    }
}
