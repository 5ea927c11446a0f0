//! Boundary collaborators — touchpoint retrieval and campaign cost lookup.
//!
//! Both are external systems in production. The traits keep the engine
//! agnostic to transport; the host layer decides how blocking calls are
//! dispatched. In-memory implementations back the tests and embedded use.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use attribution_core::error::EngineResult;
use attribution_core::types::{Touchpoint, TouchpointType};

/// Read-only access to a customer's touchpoints inside a bounded window.
/// Implementations must return touchpoints in ascending timestamp order.
pub trait TouchpointProvider: Send + Sync {
    fn get_touchpoints(
        &self,
        customer_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> EngineResult<Vec<Touchpoint>>;
}

/// Campaign spend lookup. Returns 0 when the cost is unknown.
pub trait CampaignCostProvider: Send + Sync {
    fn get_campaign_cost(
        &self,
        campaign_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<f64>;
}

/// A raw interaction event as delivered by the event platform, before it is
/// classified into one of the touchpoint types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlatformEvent {
    pub event_id: Uuid,
    pub customer_id: String,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub channel: Option<String>,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub content: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl RawPlatformEvent {
    /// Map a raw platform event onto a touchpoint, classifying its type
    /// from the source/medium heuristics.
    pub fn into_touchpoint(self) -> Touchpoint {
        let touchpoint_type = TouchpointType::from_source_medium(
            self.source.as_deref().unwrap_or(""),
            self.medium.as_deref().unwrap_or(""),
        );
        Touchpoint {
            id: self.event_id,
            customer_id: self.customer_id,
            touchpoint_type,
            channel: self.channel,
            campaign_id: self.campaign_id,
            campaign_name: self.campaign_name,
            source: self.source,
            medium: self.medium,
            content: self.content,
            timestamp: self.timestamp,
        }
    }
}

// ─── In-memory implementations ──────────────────────────────────────────────

/// In-memory touchpoint store keyed by customer id.
#[derive(Default)]
pub struct MemoryTouchpointStore {
    touchpoints: DashMap<String, Vec<Touchpoint>>,
}

impl MemoryTouchpointStore {
    pub fn new() -> Self {
        Self {
            touchpoints: DashMap::new(),
        }
    }

    pub fn add(&self, touchpoint: Touchpoint) {
        self.touchpoints
            .entry(touchpoint.customer_id.clone())
            .or_default()
            .push(touchpoint);
    }

    pub fn ingest(&self, event: RawPlatformEvent) {
        self.add(event.into_touchpoint());
    }
}

impl TouchpointProvider for MemoryTouchpointStore {
    fn get_touchpoints(
        &self,
        customer_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> EngineResult<Vec<Touchpoint>> {
        let mut result: Vec<Touchpoint> = self
            .touchpoints
            .get(customer_id)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|t| t.timestamp >= window_start && t.timestamp <= window_end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        result.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(result)
    }
}

/// Fixed per-campaign costs, for tests and embedded use.
#[derive(Default)]
pub struct StaticCostProvider {
    costs: DashMap<String, f64>,
}

impl StaticCostProvider {
    pub fn new() -> Self {
        Self {
            costs: DashMap::new(),
        }
    }

    pub fn set_cost(&self, campaign_id: &str, cost: f64) {
        self.costs.insert(campaign_id.to_string(), cost);
    }
}

impl CampaignCostProvider for StaticCostProvider {
    fn get_campaign_cost(
        &self,
        campaign_id: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> EngineResult<f64> {
        Ok(self.costs.get(campaign_id).map(|c| *c).unwrap_or(0.0))
    }
}
