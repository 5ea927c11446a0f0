pub mod config;
pub mod error;
pub mod model;
pub mod types;

pub use config::AttributionConfig;
pub use error::{AttributionError, EngineResult};
pub use model::{AttributionModel, CustomModelConfig, ModelStatus, ModelType, PositionWeights};
pub use types::{
    ConversionData, JourneyComplexity, JourneySummary, PrimaryAttribution, RevenueAttribution,
    Touchpoint, TouchpointAttribution, TouchpointType,
};
