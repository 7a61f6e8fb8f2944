//! Conversation state and turn taking for the Jinny voice assistant
//!
//! Features:
//! - Bounded per-session conversation history with time-based expiry
//! - Turn-taking coordinator keeping capture and synthesis mutually exclusive
//! - Client preference cache

pub mod conversation;
pub mod preferences;
pub mod turn;

pub use conversation::ConversationStore;
pub use preferences::{
    FilePreferenceStore, InMemoryPreferenceStore, PreferenceError, PreferenceStore, Preferences,
};
pub use turn::{
    transition, Coordinator, Effect, EffectRunner, Engines, RecognizerErrorKind, TurnError,
    TurnEvent, TurnHandle, TurnRuntime, TurnState, TurnTimings,
};
