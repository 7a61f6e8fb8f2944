//! Configuration management for the Jinny voice assistant
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (`JINNY__` prefix, plus `PORT`, `OPENAI_API_KEY`, `GROQ_API_KEY`)
//!
//! The model catalog is static configuration: it is loaded once at process
//! start and never mutated afterwards.

pub mod constants;
pub mod models;
pub mod settings;

pub use models::{default_catalog, ModelDescriptor, ProviderKind};
pub use settings::{
    load_settings, load_settings_from, ConversationConfig, ObservabilityConfig, ProviderConfig,
    ProvidersConfig, ServerConfig, Settings, TurnConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
