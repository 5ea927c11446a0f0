//! Attribution analytics — campaign reports, channel performance, and
//! cross-model comparison, aggregated from recorded attribution results.
//!
//! Aggregations are read-only: they never recompute per-touchpoint weights,
//! only roll up what the engine recorded. A period with no matching records
//! is a valid empty result, not an error.

pub mod campaign;
pub mod channel;
pub mod comparison;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use attribution_core::error::EngineResult;
use attribution_engine::providers::CampaignCostProvider;
use attribution_engine::recorder::AttributionStore;
use attribution_engine::registry::ModelRegistry;

pub use campaign::{CampaignReport, DailyRevenuePoint, PositionBreakdown, Trend};
pub use channel::ChannelPerformance;
pub use comparison::{ModelComparison, ModelComparisonEntry};

pub struct AnalyticsEngine {
    store: Arc<dyn AttributionStore>,
    costs: Arc<dyn CampaignCostProvider>,
    registry: Arc<ModelRegistry>,
}

impl AnalyticsEngine {
    pub fn new(
        store: Arc<dyn AttributionStore>,
        costs: Arc<dyn CampaignCostProvider>,
        registry: Arc<ModelRegistry>,
    ) -> Self {
        Self {
            store,
            costs,
            registry,
        }
    }

    /// Campaign report over [start, end]: totals, model usage, position
    /// breakdown, daily time series with trend, and ROI against the
    /// campaign's cost.
    pub fn campaign_report(
        &self,
        campaign_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<CampaignReport> {
        let records = self.store.records_between(start, end);
        debug!(campaign_id = %campaign_id, records = records.len(), "building campaign report");
        let cost = self.costs.get_campaign_cost(campaign_id, start, end)?;
        Ok(campaign::build_report(campaign_id, start, end, &records, cost))
    }

    /// Per-channel rollup over [start, end], sorted by revenue descending.
    pub fn channel_performance(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<ChannelPerformance> {
        let records = self.store.records_between(start, end);
        channel::build_performance(&records)
    }

    /// Compare recorded models over [start, end], optionally restricted to
    /// one campaign. Inactive models are listed but never recommended.
    pub fn compare_models(
        &self,
        campaign_id: Option<&str>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ModelComparison {
        let records = self.store.records_between(start, end);
        comparison::build_comparison(campaign_id, start, end, &records, |key| {
            self.registry.is_key_active(key)
        })
    }
}
