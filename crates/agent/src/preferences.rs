//! Client preferences
//!
//! A local, non-authoritative cache of the user's voice, language and model
//! choices. The server never relies on it.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use jinny_config::constants::turn::DEFAULT_LANGUAGE;

/// User-selected options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Synthesizer voice; engine default when unset
    #[serde(default)]
    pub voice_name: Option<String>,

    /// Recognition language tag
    #[serde(default = "default_language")]
    pub recognition_language: String,

    /// Model id attached to every transcript
    #[serde(default)]
    pub model_id: Option<String>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            voice_name: None,
            recognition_language: default_language(),
            model_id: None,
        }
    }
}

impl Preferences {
    /// Defaults with the given recognition language
    pub fn for_language(language: impl Into<String>) -> Self {
        Self {
            recognition_language: language.into(),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_voice(mut self, voice_name: impl Into<String>) -> Self {
        self.voice_name = Some(voice_name.into());
        self
    }

    /// Payload for a `load-context` message
    pub fn to_context(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("Preference I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid preference file: {0}")]
    Format(#[from] serde_json::Error),
}

/// Persistence for [`Preferences`]
pub trait PreferenceStore: Send + Sync {
    /// Stored preferences; `None` when nothing was saved yet
    fn load(&self) -> Result<Option<Preferences>, PreferenceError>;

    fn save(&self, preferences: &Preferences) -> Result<(), PreferenceError>;
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Option<Preferences>, PreferenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, preferences: &Preferences) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(preferences)?;
        std::fs::write(&self.path, raw)?;
        tracing::debug!(path = %self.path.display(), "Preferences saved");
        Ok(())
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    inner: Mutex<Option<Preferences>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn load(&self) -> Result<Option<Preferences>, PreferenceError> {
        Ok(self.inner.lock().clone())
    }

    fn save(&self, preferences: &Preferences) -> Result<(), PreferenceError> {
        *self.inner.lock() = Some(preferences.clone());
        Ok(())
    }
}
