//! Completion gateway
//!
//! Routes a conversation history to the provider serving the resolved model.
//! Exactly one attempt per call; the gateway never touches the conversation
//! store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use jinny_config::{ModelDescriptor, ProviderKind, ProvidersConfig};
use jinny_core::Turn;

use crate::backend::{ChatProvider, ChatRequest};
use crate::factory::ProviderFactory;
use crate::CompletionError;

/// Routes completion requests by provider family
#[derive(Clone, Default)]
pub struct CompletionGateway {
    providers: HashMap<ProviderKind, Arc<dyn ChatProvider>>,
}

impl CompletionGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build with every provider that has credentials
    pub fn from_settings(config: &ProvidersConfig) -> Self {
        Self {
            providers: ProviderFactory::create_all(config),
        }
    }

    /// Register a provider, replacing any existing one of the same kind
    pub fn with_provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn has_provider(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Request a completion for `history` from the model in `descriptor`
    pub async fn complete(
        &self,
        history: &[Turn],
        descriptor: &ModelDescriptor,
    ) -> Result<String, CompletionError> {
        let provider = self.providers.get(&descriptor.provider).ok_or_else(|| {
            CompletionError::UpstreamError(format!(
                "provider not configured: {}",
                descriptor.provider
            ))
        })?;

        let request = ChatRequest::from_history(history, descriptor);
        let start = Instant::now();
        let result = provider.complete(request).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(text) => tracing::debug!(
                model = %descriptor.id,
                provider = %descriptor.provider,
                elapsed_ms,
                chars = text.len(),
                "Completion received"
            ),
            Err(e) => tracing::warn!(
                model = %descriptor.id,
                provider = %descriptor.provider,
                elapsed_ms,
                error = %e,
                "Completion failed"
            ),
        }

        result
    }
}

impl std::fmt::Debug for CompletionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionGateway")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}
