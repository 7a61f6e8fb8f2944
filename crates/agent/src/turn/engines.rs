//! Collaborator interfaces driven by the turn runtime
//!
//! Implementations report their callbacks (recognizer started/ended,
//! results, synthesis end) back through a [`TurnHandle`](super::TurnHandle).

use async_trait::async_trait;

use jinny_core::TranscriptPayload;

use super::state::TurnState;
use super::TurnError;

/// Speech-to-text engine
pub trait Recognizer: Send + Sync {
    /// Whether the platform offers recognition at all
    fn is_supported(&self) -> bool;

    /// Begin continuous capture
    fn start(&self, language: &str) -> Result<(), TurnError>;

    /// Stop capture; the engine delivers any last result and then ends
    fn stop(&self);
}

/// Text-to-speech engine
pub trait Synthesizer: Send + Sync {
    fn speak(&self, text: &str, voice: Option<&str>);
    fn cancel(&self);
    fn pause(&self);
    fn resume(&self);

    /// The engine's own view of whether audio is playing
    fn is_speaking(&self) -> bool;
}

/// Outbound channel to the relay
#[async_trait]
pub trait TranscriptSink: Send + Sync {
    async fn send_transcript(&self, payload: TranscriptPayload) -> Result<(), TurnError>;
}

/// What the UI is asked to show
#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    State(TurnState),
    Transcript { final_text: String, interim: String },
    Response { text: String },
    Error { message: String },
}

/// UI surface
pub trait StatusView: Send + Sync {
    fn render(&self, update: ViewUpdate);
}

/// View that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingView;

impl StatusView for TracingView {
    fn render(&self, update: ViewUpdate) {
        match update {
            ViewUpdate::State(state) => tracing::info!(state = %state, "Turn state"),
            ViewUpdate::Transcript { final_text, interim } => {
                tracing::debug!(final_text = %final_text, interim = %interim, "Transcript")
            },
            ViewUpdate::Response { text } => tracing::info!(chars = text.len(), "Response"),
            ViewUpdate::Error { message } => tracing::warn!(message = %message, "Turn error"),
        }
    }
}
