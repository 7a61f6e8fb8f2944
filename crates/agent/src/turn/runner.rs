//! Effect execution
//!
//! Effects run strictly in the order the coordinator produced them.
//! Engine failures are fed back into the event stream rather than returned.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use jinny_core::TranscriptPayload;

use super::engines::{Recognizer, StatusView, Synthesizer, TranscriptSink, ViewUpdate};
use super::state::{Effect, RecognizerErrorKind, TurnEvent};
use crate::preferences::Preferences;

/// Collaborators the runner drives
#[derive(Clone)]
pub struct Engines {
    pub recognizer: Arc<dyn Recognizer>,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub sink: Arc<dyn TranscriptSink>,
    pub view: Arc<dyn StatusView>,
}

/// Executes coordinator effects against the engines
pub struct EffectRunner {
    engines: Engines,
    events: mpsc::UnboundedSender<TurnEvent>,
    preferences: Arc<RwLock<Preferences>>,
}

impl EffectRunner {
    pub fn new(
        engines: Engines,
        events: mpsc::UnboundedSender<TurnEvent>,
        preferences: Arc<RwLock<Preferences>>,
    ) -> Self {
        Self {
            engines,
            events,
            preferences,
        }
    }

    pub async fn run(&self, effect: Effect) {
        match effect {
            Effect::StartCapture => {
                let language = self.preferences.read().recognition_language.clone();
                if let Err(e) = self.engines.recognizer.start(&language) {
                    tracing::warn!(error = %e, "Recognizer failed to start");
                    self.emit(TurnEvent::RecognizerError(RecognizerErrorKind::Other(
                        e.to_string(),
                    )));
                }
            },
            Effect::StopCapture => self.engines.recognizer.stop(),
            Effect::Speak { text } => {
                let voice = self.preferences.read().voice_name.clone();
                self.engines.synthesizer.speak(&text, voice.as_deref());
            },
            Effect::CancelSpeech => self.engines.synthesizer.cancel(),
            Effect::PauseSpeech => self.engines.synthesizer.pause(),
            Effect::ResumeSpeech => self.engines.synthesizer.resume(),
            Effect::SendTranscript { final_text, interim } => {
                let payload = TranscriptPayload {
                    final_text,
                    interim,
                    model: self.preferences.read().model_id.clone(),
                };
                if let Err(e) = self.engines.sink.send_transcript(payload).await {
                    tracing::warn!(error = %e, "Failed to send transcript");
                    self.emit(TurnEvent::RelayError {
                        message: e.to_string(),
                    });
                }
            },
            Effect::ShowTranscript { final_text, interim } => {
                self.engines
                    .view
                    .render(ViewUpdate::Transcript { final_text, interim });
            },
            Effect::ShowResponse { text } => {
                self.engines.view.render(ViewUpdate::Response { text });
            },
            Effect::ShowError { message } => {
                self.engines.view.render(ViewUpdate::Error { message });
            },
            Effect::ArmSilenceTimer { generation, after } => {
                self.schedule(after, TurnEvent::SilenceElapsed { generation });
            },
            Effect::ScheduleRestart { generation, after } => {
                self.schedule(after, TurnEvent::RestartElapsed { generation });
            },
        }
    }

    fn emit(&self, event: TurnEvent) {
        let _ = self.events.send(event);
    }

    /// Deliver `event` after `after`; stale timers are discarded by generation
    fn schedule(&self, after: Duration, event: TurnEvent) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = events.send(event);
        });
    }
}
