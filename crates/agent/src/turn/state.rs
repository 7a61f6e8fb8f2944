//! Turn-taking states, events and effects

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Observable turn-taking state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    /// Neither capturing nor speaking
    Idle,
    /// Microphone capture active (or about to restart)
    Listening,
    /// Transcript sent, waiting for the completion
    Processing,
    /// Synthesizer playing the reply
    Speaking,
    /// Playback paused by the user
    Paused,
    /// Listening with live mode on; reported to observers only
    LiveActive,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnState::Idle => "idle",
            TurnState::Listening => "listening",
            TurnState::Processing => "processing",
            TurnState::Speaking => "speaking",
            TurnState::Paused => "paused",
            TurnState::LiveActive => "live_active",
        }
    }
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognizer error codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognizerErrorKind {
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    NotAllowed,
    Other(String),
}

impl RecognizerErrorKind {
    /// Parse a browser-style error code
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "not-allowed" | "service-not-allowed" => Self::NotAllowed,
            other => Self::Other(other.to_string()),
        }
    }

    /// Transient errors are swallowed; the recognizer ends and may restart
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NoSpeech | Self::Aborted)
    }

    pub fn message(&self) -> String {
        match self {
            Self::NoSpeech => "No speech detected".to_string(),
            Self::Aborted => "Recognition aborted".to_string(),
            Self::AudioCapture => "No microphone was found".to_string(),
            Self::Network => "Speech recognition network error".to_string(),
            Self::NotAllowed => "Microphone permission denied".to_string(),
            Self::Other(code) => format!("Speech recognition error: {}", code),
        }
    }
}

/// Inputs to the coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    // User controls
    StartCapture,
    ReleaseCapture,
    SetLiveMode(bool),
    Stop,
    Pause,
    Resume,

    // Page lifecycle
    VisibilityHidden,
    Unload,

    // Recognizer callbacks
    RecognizerStarted,
    RecognizerResult { final_text: String, interim: String },
    RecognizerEnded,
    RecognizerError(RecognizerErrorKind),

    // Relay
    CompletionReceived { text: String },
    RelayError { message: String },

    // Synthesizer callbacks
    SynthesisStarted,
    SynthesisEnded,
    SynthesisFailed,

    // Timers
    SilenceElapsed { generation: u64 },
    RestartElapsed { generation: u64 },
    WatchdogTick { engine_speaking: bool },
}

impl TurnEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TurnEvent::StartCapture => "start_capture",
            TurnEvent::ReleaseCapture => "release_capture",
            TurnEvent::SetLiveMode(_) => "set_live_mode",
            TurnEvent::Stop => "stop",
            TurnEvent::Pause => "pause",
            TurnEvent::Resume => "resume",
            TurnEvent::VisibilityHidden => "visibility_hidden",
            TurnEvent::Unload => "unload",
            TurnEvent::RecognizerStarted => "recognizer_started",
            TurnEvent::RecognizerResult { .. } => "recognizer_result",
            TurnEvent::RecognizerEnded => "recognizer_ended",
            TurnEvent::RecognizerError(_) => "recognizer_error",
            TurnEvent::CompletionReceived { .. } => "completion_received",
            TurnEvent::RelayError { .. } => "relay_error",
            TurnEvent::SynthesisStarted => "synthesis_started",
            TurnEvent::SynthesisEnded => "synthesis_ended",
            TurnEvent::SynthesisFailed => "synthesis_failed",
            TurnEvent::SilenceElapsed { .. } => "silence_elapsed",
            TurnEvent::RestartElapsed { .. } => "restart_elapsed",
            TurnEvent::WatchdogTick { .. } => "watchdog_tick",
        }
    }
}

/// Side effects requested by the coordinator, executed in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartCapture,
    StopCapture,
    Speak { text: String },
    CancelSpeech,
    PauseSpeech,
    ResumeSpeech,
    SendTranscript { final_text: String, interim: String },
    ShowTranscript { final_text: String, interim: String },
    ShowResponse { text: String },
    ShowError { message: String },
    ArmSilenceTimer { generation: u64, after: Duration },
    ScheduleRestart { generation: u64, after: Duration },
}
