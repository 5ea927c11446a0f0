//! Model registry — standard model definitions plus custom model CRUD.
//!
//! Read-mostly: calculations resolve a whole-value snapshot of the model at
//! the start and never re-read mid-calculation, so concurrent edits cannot
//! produce a result mixing two parameter sets. Updates replace the entire
//! stored value and bump its version.

use std::collections::HashMap;

use chrono::Utc;
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use attribution_core::config::AttributionConfig;
use attribution_core::error::{AttributionError, EngineResult};
use attribution_core::model::{
    AttributionModel, CustomModelConfig, ModelStatus, ModelType,
};

/// How a caller names the model to use for one calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRef {
    Standard(ModelType),
    Custom(Uuid),
}

pub struct ModelRegistry {
    standard: HashMap<ModelType, AttributionModel>,
    custom: DashMap<Uuid, AttributionModel>,
    defaults: AttributionConfig,
}

impl ModelRegistry {
    /// Seed the registry with the standard model set using built-in
    /// defaults. Standard definitions are immutable after construction.
    pub fn new() -> Self {
        Self::with_config(AttributionConfig::default())
    }

    /// Seed the registry from engine configuration: standard models and
    /// new custom models pick up the configured windows, decay rate, and
    /// position weights.
    pub fn with_config(config: AttributionConfig) -> Self {
        let standard = ModelType::standard_types()
            .into_iter()
            .map(|t| (t, AttributionModel::from_config(t, &config)))
            .collect();
        Self {
            standard,
            custom: DashMap::new(),
            defaults: config,
        }
    }

    /// Resolve a model reference to a snapshot the calculator can hold for
    /// the duration of one calculation.
    pub fn resolve(&self, model_ref: &ModelRef) -> EngineResult<AttributionModel> {
        match model_ref {
            ModelRef::Standard(ModelType::Custom) => Err(AttributionError::ModelNotFound(
                "custom models are addressed by id".to_string(),
            )),
            ModelRef::Standard(model_type) => self
                .standard
                .get(model_type)
                .cloned()
                .ok_or_else(|| AttributionError::ModelNotFound(model_type.to_string())),
            ModelRef::Custom(id) => self
                .custom
                .get(id)
                .map(|m| m.clone())
                .ok_or_else(|| AttributionError::ModelNotFound(id.to_string())),
        }
    }

    /// Create a custom model from a caller-supplied configuration.
    pub fn create_custom(&self, config: CustomModelConfig) -> EngineResult<Uuid> {
        let mut model = AttributionModel::from_config(ModelType::Custom, &self.defaults);
        model.name = config.name;
        model.touchpoint_weights = config.touchpoint_weights;
        if let Some(window) = config.attribution_window_days {
            model.attribution_window_days = window;
        }
        if let Some(lookback) = config.lookback_window_days {
            model.lookback_window_days = lookback;
        }
        if let Some(rate) = config.time_decay_rate {
            model.time_decay_rate = rate;
        }
        model.validate()?;

        let id = model.id;
        info!(model_id = %id, name = %model.name, "custom attribution model created");
        self.custom.insert(id, model);
        Ok(id)
    }

    /// Replace a custom model's configuration wholesale, bumping its
    /// version. In-flight calculations keep their snapshot.
    pub fn update_custom(&self, id: Uuid, config: CustomModelConfig) -> EngineResult<u32> {
        let mut entry = self
            .custom
            .get_mut(&id)
            .ok_or_else(|| AttributionError::ModelNotFound(id.to_string()))?;

        let mut replacement = entry.clone();
        replacement.name = config.name;
        replacement.touchpoint_weights = config.touchpoint_weights;
        if let Some(window) = config.attribution_window_days {
            replacement.attribution_window_days = window;
        }
        if let Some(lookback) = config.lookback_window_days {
            replacement.lookback_window_days = lookback;
        }
        if let Some(rate) = config.time_decay_rate {
            replacement.time_decay_rate = rate;
        }
        replacement.version += 1;
        replacement.updated_at = Utc::now();
        replacement.validate()?;

        let version = replacement.version;
        *entry = replacement;
        info!(model_id = %id, version, "custom attribution model updated");
        Ok(version)
    }

    /// Record training metadata on a custom model.
    pub fn record_training(&self, id: Uuid, accuracy: f64) -> EngineResult<()> {
        let mut entry = self
            .custom
            .get_mut(&id)
            .ok_or_else(|| AttributionError::ModelNotFound(id.to_string()))?;
        entry.accuracy = Some(accuracy);
        entry.last_trained_at = Some(Utc::now());
        entry.updated_at = Utc::now();
        Ok(())
    }

    /// Toggle a custom model between Active and Inactive. Inactive models
    /// still resolve (historical recomputation) but are skipped by
    /// recommendation logic. Models are never hard-deleted.
    pub fn set_status(&self, id: Uuid, status: ModelStatus) -> EngineResult<()> {
        let mut entry = self
            .custom
            .get_mut(&id)
            .ok_or_else(|| AttributionError::ModelNotFound(id.to_string()))?;
        entry.status = status;
        entry.updated_at = Utc::now();
        info!(model_id = %id, status = ?status, "custom attribution model status changed");
        Ok(())
    }

    /// Standard models followed by custom models.
    pub fn list_models(&self) -> Vec<AttributionModel> {
        let mut models: Vec<AttributionModel> = ModelType::standard_types()
            .into_iter()
            .filter_map(|t| self.standard.get(&t).cloned())
            .collect();
        models.extend(self.custom.iter().map(|m| m.clone()));
        models
    }

    /// Whether the model behind a recorded model key is currently active.
    /// Standard models always are; unknown keys (e.g. a custom model seen
    /// in old records from another deployment) are treated as inactive.
    pub fn is_key_active(&self, model_key: &str) -> bool {
        if let Some(id) = model_key.strip_prefix("custom:") {
            return id
                .parse::<Uuid>()
                .ok()
                .and_then(|id| self.custom.get(&id).map(|m| m.is_active()))
                .unwrap_or(false);
        }
        self.standard.values().any(|m| m.model_key() == model_key)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
