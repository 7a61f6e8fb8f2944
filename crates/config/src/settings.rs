//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::constants::{conversation, providers, turn, DEFAULT_MODEL_ID, DEFAULT_SYSTEM_PROMPT};
use crate::models::{default_catalog, ModelDescriptor};
use crate::ConfigError;

const PORT_ENV: &str = "PORT";
const SERVER_PORT_ENV: &str = "JINNY__SERVER__PORT";

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Conversation history policy
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Selectable models
    #[serde(default = "default_catalog")]
    pub models: Vec<ModelDescriptor>,

    /// Model used when a request names none or an unknown one
    #[serde(default = "default_model_id")]
    pub default_model: String,

    /// Provider endpoints and credentials
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Client turn-taking timings
    #[serde(default)]
    pub turn: TurnConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            conversation: ConversationConfig::default(),
            models: default_catalog(),
            default_model: default_model_id(),
            providers: ProvidersConfig::default(),
            turn: TurnConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_conversation()?;
        self.validate_models()?;
        self.validate_turn()?;
        Ok(())
    }

    fn validate_conversation(&self) -> Result<(), ConfigError> {
        let conv = &self.conversation;

        // System prompt plus at least one turn
        if conv.max_turns < 2 {
            return Err(ConfigError::InvalidValue {
                field: "conversation.max_turns".to_string(),
                message: format!("Must be at least 2, got {}", conv.max_turns),
            });
        }

        for (field, value) in [
            ("conversation.expiry_secs", conv.expiry_secs),
            ("conversation.sweep_interval_secs", conv.sweep_interval_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "Must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }

    fn validate_models(&self) -> Result<(), ConfigError> {
        if self.models.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "models".to_string(),
                message: "At least one model must be configured".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for model in &self.models {
            if !seen.insert(model.id.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "models".to_string(),
                    message: format!("Duplicate model id: {}", model.id),
                });
            }
            if !(0.0..=2.0).contains(&model.temperature) {
                return Err(ConfigError::InvalidValue {
                    field: format!("models.{}.temperature", model.id),
                    message: format!("Must be between 0.0 and 2.0, got {}", model.temperature),
                });
            }
            if model.max_tokens == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("models.{}.max_tokens", model.id),
                    message: "Must be greater than zero".to_string(),
                });
            }
        }

        if !seen.contains(self.default_model.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "default_model".to_string(),
                message: format!("{} is not in the model catalog", self.default_model),
            });
        }

        Ok(())
    }

    fn validate_turn(&self) -> Result<(), ConfigError> {
        if self.turn.silence_threshold_ms == 0 || self.turn.watchdog_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "turn".to_string(),
                message: "Silence threshold and watchdog interval must be greater than zero"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Honor the conventional `PORT`, `OPENAI_API_KEY` and `GROQ_API_KEY` variables
    ///
    /// `JINNY__SERVER__PORT` wins over `PORT`; configured API keys win over
    /// the provider variables.
    pub fn apply_env_fallbacks(&mut self) {
        self.apply_fallbacks_from(|name| std::env::var(name).ok());
    }

    fn apply_fallbacks_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if lookup(SERVER_PORT_ENV).is_none() {
            if let Some(port) = lookup(PORT_ENV).and_then(|p| p.parse().ok()) {
                self.server.port = port;
            }
        }
        if self.providers.openai.api_key.is_none() {
            self.providers.openai.api_key = lookup(providers::OPENAI_API_KEY_ENV);
        }
        if self.providers.groq.api_key.is_none() {
            self.providers.groq.api_key = lookup(providers::GROQ_API_KEY_ENV);
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served as static assets (the browser client)
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_static_dir() -> String {
    "public".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
        }
    }
}

/// Conversation history policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Maximum history length including the system prompt
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Idle time after which a session is swept
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u64,

    /// Sweep interval
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// How long history survives a disconnect
    #[serde(default = "default_disconnect_linger_secs")]
    pub disconnect_linger_secs: u64,

    /// Prompt seeded at index 0
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_max_turns() -> usize {
    conversation::MAX_TURNS
}
fn default_expiry_secs() -> u64 {
    conversation::EXPIRY_SECS
}
fn default_sweep_interval_secs() -> u64 {
    conversation::SWEEP_INTERVAL_SECS
}
fn default_disconnect_linger_secs() -> u64 {
    conversation::DISCONNECT_LINGER_SECS
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            expiry_secs: default_expiry_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            disconnect_linger_secs: default_disconnect_linger_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl ConversationConfig {
    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn disconnect_linger(&self) -> Duration {
        Duration::from_secs(self.disconnect_linger_secs)
    }
}

/// Endpoint and credentials for one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API
    pub endpoint: String,

    /// API key; falls back to the provider's conventional environment variable
    #[serde(default)]
    pub api_key: Option<String>,

    /// Optional HTTP timeout; completions are not time-limited by default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            timeout_secs: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_openai")]
    pub openai: ProviderConfig,

    #[serde(default = "default_groq")]
    pub groq: ProviderConfig,
}

fn default_openai() -> ProviderConfig {
    ProviderConfig::new(providers::OPENAI_ENDPOINT)
}
fn default_groq() -> ProviderConfig {
    ProviderConfig::new(providers::GROQ_ENDPOINT)
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: default_openai(),
            groq: default_groq(),
        }
    }
}

/// Client turn-taking timings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnConfig {
    /// Silence after the last interim result before auto-submit
    #[serde(default = "default_silence_threshold_ms")]
    pub silence_threshold_ms: u64,

    /// Debounce before capture restarts after synthesis
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,

    /// Synthesis watchdog interval
    #[serde(default = "default_watchdog_interval_ms")]
    pub watchdog_interval_ms: u64,

    /// Recognition language tag
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_silence_threshold_ms() -> u64 {
    turn::SILENCE_THRESHOLD_MS
}
fn default_restart_delay_ms() -> u64 {
    turn::RESTART_DELAY_MS
}
fn default_watchdog_interval_ms() -> u64 {
    turn::WATCHDOG_INTERVAL_MS
}
fn default_language() -> String {
    turn::DEFAULT_LANGUAGE.to_string()
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            silence_threshold_ms: default_silence_threshold_ms(),
            restart_delay_ms: default_restart_delay_ms(),
            watchdog_interval_ms: default_watchdog_interval_ms(),
            language: default_language(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable the Prometheus exporter
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/default`, `config/{env}` and `JINNY__*` variables
///
/// Priority: env vars > config/{env} > config/default > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from an explicit config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::from(dir.join("default")).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::from(dir.join(env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("JINNY")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let mut settings: Settings = config.try_deserialize()?;
    settings.apply_env_fallbacks();

    settings.validate()?;

    tracing::debug!(
        models = settings.models.len(),
        default_model = %settings.default_model,
        "Settings loaded"
    );

    Ok(settings)
}
