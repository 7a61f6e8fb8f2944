//! Relay message envelopes
//!
//! Every frame on the relay channel is a JSON object of the form
//! `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};

/// Transcript submitted by the client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptPayload {
    /// Finalized speech segment; only a non-empty (trimmed) value triggers processing
    #[serde(rename = "final", default)]
    pub final_text: String,
    /// Interim (not yet final) speech
    #[serde(default)]
    pub interim: String,
    /// Requested model id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl TranscriptPayload {
    pub fn new(final_text: impl Into<String>) -> Self {
        Self {
            final_text: final_text.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// The finalized text with surrounding whitespace removed, if any remains
    pub fn trimmed_final(&self) -> Option<&str> {
        let text = self.final_text.trim();
        (!text.is_empty()).then_some(text)
    }
}

/// Messages sent from the browser to the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Recognized speech
    Transcript(TranscriptPayload),
    /// Drop the stored conversation history
    ResetContext,
    /// Arbitrary client preferences, merged best-effort into the session
    LoadContext(serde_json::Value),
}

/// Messages sent from the relay to the browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Connection id assigned on connect
    SessionInfo {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    /// Assistant reply
    GptResponse { text: String, model: String },
    /// Failure surfaced to the originating session only
    Error { message: String, details: String },
    /// Acknowledges a `reset-context`
    ContextReset { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            details: details.into(),
        }
    }

    /// Event name as it appears on the wire
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::SessionInfo { .. } => "session-info",
            ServerMessage::GptResponse { .. } => "gpt-response",
            ServerMessage::Error { .. } => "error",
            ServerMessage::ContextReset { .. } => "context-reset",
        }
    }
}
