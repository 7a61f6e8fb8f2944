//! Client-side turn taking
//!
//! Arbitrates the microphone and the speech synthesizer so they never talk
//! over each other:
//! - [`coordinator`]: pure state machine (`TurnEvent` in, `Effect`s out)
//! - [`runner`]: executes effects against the engine traits
//! - [`runtime`]: tokio event loop with timers and the synthesis watchdog

pub mod coordinator;
pub mod engines;
pub mod runner;
pub mod runtime;
pub mod state;

pub use coordinator::{transition, Coordinator, TurnTimings, UNCONFIRMED_SPEECH_TICKS};
pub use engines::{Recognizer, StatusView, Synthesizer, TracingView, TranscriptSink, ViewUpdate};
pub use runner::{EffectRunner, Engines};
pub use runtime::{TurnHandle, TurnRuntime};
pub use state::{Effect, RecognizerErrorKind, TurnEvent, TurnState};

use thiserror::Error;

/// Turn-taking errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TurnError {
    #[error("Speech recognition is not supported on this platform")]
    RecognizerUnsupported,

    #[error("Recognizer error: {0}")]
    Recognizer(String),

    #[error("Relay error: {0}")]
    Relay(String),

    #[error("Turn runtime closed")]
    Closed,
}
