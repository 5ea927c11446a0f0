//! Revenue attribution engine — decides how much of each conversion's
//! revenue to credit to the marketing touchpoints that preceded it.

pub mod calculator;
pub mod confidence;
pub mod journey;
pub mod providers;
pub mod recorder;
pub mod registry;
pub mod service;

pub use providers::{
    CampaignCostProvider, MemoryTouchpointStore, RawPlatformEvent, StaticCostProvider,
    TouchpointProvider,
};
pub use recorder::{AttributionStore, MemoryAttributionStore, Recorder};
pub use registry::{ModelRef, ModelRegistry};
pub use service::AttributionEngine;
