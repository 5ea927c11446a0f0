//! Attribution model definitions — the five standard strategies, the
//! data-driven placeholder, and user-configured custom models.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AttributionConfig;
use crate::error::{AttributionError, EngineResult};
use crate::types::TouchpointType;

/// Computation strategy for splitting conversion revenue across touchpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    FirstTouch,
    LastTouch,
    Linear,
    TimeDecay,
    PositionBased,
    Custom,
    /// Placeholder: no learned-weight algorithm exists yet. Calculations
    /// fall back to linear weights so revenue conservation holds.
    DataDriven,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::FirstTouch => "first_touch",
            ModelType::LastTouch => "last_touch",
            ModelType::Linear => "linear",
            ModelType::TimeDecay => "time_decay",
            ModelType::PositionBased => "position_based",
            ModelType::Custom => "custom",
            ModelType::DataDriven => "data_driven",
        }
    }

    /// The five standard models plus the data-driven placeholder.
    pub fn standard_types() -> [ModelType; 6] {
        [
            ModelType::FirstTouch,
            ModelType::LastTouch,
            ModelType::Linear,
            ModelType::TimeDecay,
            ModelType::PositionBased,
            ModelType::DataDriven,
        ]
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a model definition. Standard models are always
/// Active; custom models toggle Active↔Inactive and are never hard-deleted
/// while attribution records reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Draft,
    Active,
    Inactive,
}

/// Weight split for the position-based model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionWeights {
    pub first: f64,
    pub last: f64,
    pub middle: f64,
}

impl Default for PositionWeights {
    fn default() -> Self {
        Self {
            first: 0.4,
            last: 0.4,
            middle: 0.2,
        }
    }
}

impl PositionWeights {
    pub fn validate(&self) -> EngineResult<()> {
        if self.first < 0.0 || self.last < 0.0 || self.middle < 0.0 {
            return Err(AttributionError::InvalidModelConfiguration(
                "position weights must be non-negative".to_string(),
            ));
        }
        let sum = self.first + self.last + self.middle;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(AttributionError::InvalidModelConfiguration(format!(
                "position weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

/// A named attribution computation strategy with its parameters.
///
/// Standard models carry fixed constants; custom models carry supplied,
/// validated parameters. The registry hands out whole-value snapshots so a
/// calculation never observes a half-updated model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionModel {
    pub id: Uuid,
    pub name: String,
    pub model_type: ModelType,
    pub status: ModelStatus,
    pub attribution_window_days: u32,
    pub lookback_window_days: u32,
    pub time_decay_rate: f64,
    /// Per-touchpoint-type weights, custom models only.
    pub touchpoint_weights: HashMap<TouchpointType, f64>,
    pub position_weights: PositionWeights,
    pub accuracy: Option<f64>,
    pub last_trained_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u32,
}

pub const DEFAULT_ATTRIBUTION_WINDOW_DAYS: u32 = 30;
pub const DEFAULT_LOOKBACK_WINDOW_DAYS: u32 = 90;
pub const DEFAULT_TIME_DECAY_RATE: f64 = 0.5;

impl AttributionModel {
    /// Build a standard model with the built-in default parameters.
    pub fn standard(model_type: ModelType) -> Self {
        Self::from_config(model_type, &AttributionConfig::default())
    }

    /// Build a model seeded from engine configuration, so deployments can
    /// override windows, decay rate, and position weights via environment.
    pub fn from_config(model_type: ModelType, config: &AttributionConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: model_type.as_str().to_string(),
            model_type,
            status: ModelStatus::Active,
            attribution_window_days: config.default_attribution_window_days,
            lookback_window_days: config.default_lookback_window_days,
            time_decay_rate: config.default_time_decay_rate,
            touchpoint_weights: HashMap::new(),
            position_weights: PositionWeights {
                first: config.position_weight_first,
                last: config.position_weight_last,
                middle: config.position_weight_middle,
            },
            accuracy: None,
            last_trained_at: None,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// The key recorded on attribution results: the type name for standard
    /// models, `custom:<id>` for custom models so distinct configurations
    /// stay distinguishable.
    pub fn model_key(&self) -> String {
        match self.model_type {
            ModelType::Custom => format!("custom:{}", self.id),
            other => other.as_str().to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ModelStatus::Active
    }

    /// Validate parameter consistency. Called at creation and update time so
    /// invalid configurations never reach the calculator.
    pub fn validate(&self) -> EngineResult<()> {
        if self.attribution_window_days == 0 {
            return Err(AttributionError::InvalidModelConfiguration(
                "attribution_window_days must be positive".to_string(),
            ));
        }
        if self.lookback_window_days < self.attribution_window_days {
            return Err(AttributionError::InvalidModelConfiguration(
                "lookback_window_days must cover the attribution window".to_string(),
            ));
        }
        if !(self.time_decay_rate > 0.0 && self.time_decay_rate < 1.0) {
            return Err(AttributionError::InvalidModelConfiguration(format!(
                "time_decay_rate must be in (0, 1), got {}",
                self.time_decay_rate
            )));
        }
        for (tp, weight) in &self.touchpoint_weights {
            if *weight < 0.0 {
                return Err(AttributionError::InvalidModelConfiguration(format!(
                    "negative weight {} for touchpoint type {}",
                    weight,
                    tp.as_str()
                )));
            }
        }
        self.position_weights.validate()
    }
}

/// Caller-supplied configuration for creating a custom model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomModelConfig {
    pub name: String,
    pub touchpoint_weights: HashMap<TouchpointType, f64>,
    #[serde(default)]
    pub attribution_window_days: Option<u32>,
    #[serde(default)]
    pub lookback_window_days: Option<u32>,
    #[serde(default)]
    pub time_decay_rate: Option<f64>,
}
