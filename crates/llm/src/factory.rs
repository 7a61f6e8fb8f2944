//! Provider factory
//!
//! Builds one [`ChatProvider`] per configured provider family. Providers
//! without an API key are skipped with a warning; models routed to them fail
//! at request time with "provider not configured".

use std::collections::HashMap;
use std::sync::Arc;

use jinny_config::{ProviderKind, ProvidersConfig};

use crate::backend::{ChatProvider, GroqProvider, OpenAiProvider};
use crate::CompletionError;

/// Factory for chat providers
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a single provider
    pub fn create(
        kind: ProviderKind,
        config: &ProvidersConfig,
    ) -> Result<Arc<dyn ChatProvider>, CompletionError> {
        match kind {
            ProviderKind::OpenAi => Ok(Arc::new(OpenAiProvider::new(&config.openai)?)),
            ProviderKind::Groq => Ok(Arc::new(GroqProvider::new(&config.groq)?)),
        }
    }

    /// Create every provider that has credentials
    pub fn create_all(config: &ProvidersConfig) -> HashMap<ProviderKind, Arc<dyn ChatProvider>> {
        let mut providers = HashMap::new();
        for kind in [ProviderKind::OpenAi, ProviderKind::Groq] {
            match Self::create(kind, config) {
                Ok(provider) => {
                    tracing::info!(provider = %kind, "Chat provider ready");
                    providers.insert(kind, provider);
                },
                Err(e) => {
                    tracing::warn!(provider = %kind, error = %e, "Chat provider disabled");
                },
            }
        }
        providers
    }
}
