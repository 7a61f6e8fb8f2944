//! Per-connection message handling
//!
//! Wires the conversation store, the model registry and the completion
//! gateway together. Replies go only to the session that sent the message.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jinny_agent::ConversationStore;
use jinny_core::{ClientMessage, ServerMessage, TranscriptPayload, TurnRole};
use jinny_llm::{CompletionGateway, ModelRegistry};

use crate::metrics;

const CONTEXT_RESET_MESSAGE: &str = "Conversation context has been reset";

/// Relay between browser sessions and the LLM providers
pub struct Relay {
    store: Arc<ConversationStore>,
    registry: Arc<ModelRegistry>,
    gateway: Arc<CompletionGateway>,
    disconnect_linger: Duration,
}

impl Relay {
    pub fn new(
        store: Arc<ConversationStore>,
        registry: Arc<ModelRegistry>,
        gateway: Arc<CompletionGateway>,
    ) -> Self {
        let disconnect_linger = store.config().disconnect_linger();
        Self {
            store,
            registry,
            gateway,
            disconnect_linger,
        }
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Handle one client message; `None` when nothing is sent back
    pub async fn handle(&self, session_id: &str, message: ClientMessage) -> Option<ServerMessage> {
        match message {
            ClientMessage::Transcript(payload) => self.on_transcript(session_id, payload).await,
            ClientMessage::ResetContext => {
                self.store.reset(session_id);
                Some(ServerMessage::ContextReset {
                    message: CONTEXT_RESET_MESSAGE.to_string(),
                })
            },
            ClientMessage::LoadContext(value) => {
                self.store.merge_preferences(session_id, &value);
                None
            },
        }
    }

    async fn on_transcript(
        &self,
        session_id: &str,
        payload: TranscriptPayload,
    ) -> Option<ServerMessage> {
        let text = payload.trimmed_final()?.to_string();
        metrics::record_transcript();

        let history = self.store.append(session_id, TurnRole::User, text);
        let descriptor = self.registry.resolve(payload.model.as_deref()).clone();

        tracing::debug!(
            session_id,
            model = %descriptor.id,
            turns = history.len(),
            "Requesting completion"
        );

        let start = Instant::now();
        match self.gateway.complete(&history, &descriptor).await {
            Ok(reply) => {
                metrics::record_completion_latency(
                    descriptor.provider.as_str(),
                    start.elapsed().as_secs_f64() * 1000.0,
                );
                self.store.append(session_id, TurnRole::Assistant, reply.clone());
                Some(ServerMessage::GptResponse {
                    text: reply,
                    model: descriptor.id,
                })
            },
            Err(e) => {
                metrics::record_completion_error(e.kind());
                tracing::error!(session_id, model = %descriptor.id, error = %e, "Completion failed");
                Some(ServerMessage::error(e.user_message(), e.to_string()))
            },
        }
    }

    /// Keep the session's history for the linger period, then drop it
    pub fn disconnected(&self, session_id: &str) {
        if self
            .store
            .expire_on_disconnect(session_id, self.disconnect_linger)
            .is_some()
        {
            tracing::debug!(
                session_id,
                linger_secs = self.disconnect_linger.as_secs(),
                "Scheduled conversation expiry"
            );
        }
    }
}
