//! Core types for the Jinny voice assistant
//!
//! This crate provides the foundational types shared by every other crate:
//! - Conversation turns and roles
//! - Relay message envelopes exchanged over the WebSocket channel

pub mod conversation;
pub mod message;

pub use conversation::{SessionId, Turn, TurnRole};
pub use message::{ClientMessage, ServerMessage, TranscriptPayload};
