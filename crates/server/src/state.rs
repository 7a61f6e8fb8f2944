//! Application State
//!
//! Shared state across all handlers. Built once at startup.

use std::sync::Arc;

use jinny_agent::ConversationStore;
use jinny_config::Settings;
use jinny_llm::{CompletionGateway, ModelRegistry};

use crate::relay::Relay;
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub store: Arc<ConversationStore>,
    pub registry: Arc<ModelRegistry>,
    pub relay: Arc<Relay>,
}

impl AppState {
    /// Create state with providers built from configuration
    pub fn new(config: Settings) -> Result<Self, ServerError> {
        let gateway = CompletionGateway::from_settings(&config.providers);
        Self::with_gateway(config, gateway)
    }

    /// Create state with an explicit gateway
    pub fn with_gateway(config: Settings, gateway: CompletionGateway) -> Result<Self, ServerError> {
        config.validate()?;

        let registry = Arc::new(ModelRegistry::from_config(&config)?);
        let store = Arc::new(ConversationStore::new(config.conversation.clone()));
        let relay = Arc::new(Relay::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            Arc::new(gateway),
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            registry,
            relay,
        })
    }
}
