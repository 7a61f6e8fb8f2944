//! Model registry
//!
//! Built once at startup from the configured catalog and immutable afterwards.

use std::collections::HashMap;

use jinny_config::{ConfigError, ModelDescriptor, Settings};

/// Static catalog of selectable models
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    descriptors: Vec<ModelDescriptor>,
    index: HashMap<String, usize>,
    default_index: usize,
}

impl ModelRegistry {
    /// Build a registry; the default id must be in the catalog
    pub fn new(descriptors: Vec<ModelDescriptor>, default_id: &str) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(descriptors.len());
        for (i, descriptor) in descriptors.iter().enumerate() {
            if index.insert(descriptor.id.clone(), i).is_some() {
                return Err(ConfigError::InvalidValue {
                    field: "models".to_string(),
                    message: format!("Duplicate model id: {}", descriptor.id),
                });
            }
        }

        let default_index = *index.get(default_id).ok_or_else(|| ConfigError::InvalidValue {
            field: "default_model".to_string(),
            message: format!("{} is not in the model catalog", default_id),
        })?;

        Ok(Self {
            descriptors,
            index,
            default_index,
        })
    }

    /// Build from loaded settings
    pub fn from_config(settings: &Settings) -> Result<Self, ConfigError> {
        Self::new(settings.models.clone(), &settings.default_model)
    }

    /// Resolve a requested id; unknown or absent ids fall back to the default
    pub fn resolve(&self, model_id: Option<&str>) -> &ModelDescriptor {
        match model_id.and_then(|id| self.index.get(id)) {
            Some(&i) => &self.descriptors[i],
            None => {
                if let Some(requested) = model_id {
                    tracing::debug!(requested, "Unknown model id, using default");
                }
                self.default_descriptor()
            },
        }
    }

    /// All descriptors in catalog order
    pub fn descriptors(&self) -> &[ModelDescriptor] {
        &self.descriptors
    }

    pub fn default_descriptor(&self) -> &ModelDescriptor {
        &self.descriptors[self.default_index]
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.index.contains_key(model_id)
    }
}
