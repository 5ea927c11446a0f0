//! Attribution engine facade — orchestrates touchpoint retrieval, model
//! resolution, calculation, and recording for one conversion at a time.
//!
//! Stateless per request: calculations are pure and have no external side
//! effects until the recorder persists them, so independent conversions can
//! be analyzed concurrently without coordination.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use attribution_core::config::AttributionConfig;
use attribution_core::error::{AttributionError, EngineResult};
use attribution_core::model::{AttributionModel, CustomModelConfig};
use attribution_core::types::{
    ConversionData, PrimaryAttribution, RevenueAttribution, Touchpoint, TouchpointAttribution,
    TouchpointType,
};

use crate::calculator::{self, ComputedTouchpoint};
use crate::confidence;
use crate::journey;
use crate::providers::TouchpointProvider;
use crate::recorder::{AttributionStore, Recorder};
use crate::registry::{ModelRef, ModelRegistry};

#[derive(Clone)]
pub struct AttributionEngine {
    registry: Arc<ModelRegistry>,
    touchpoints: Arc<dyn TouchpointProvider>,
    recorder: Recorder,
    config: AttributionConfig,
}

impl AttributionEngine {
    pub fn new(
        registry: Arc<ModelRegistry>,
        touchpoints: Arc<dyn TouchpointProvider>,
        store: Arc<dyn AttributionStore>,
        config: AttributionConfig,
    ) -> Self {
        Self {
            registry,
            touchpoints,
            recorder: Recorder::new(store),
            config,
        }
    }

    pub fn registry(&self) -> Arc<ModelRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn store(&self) -> Arc<dyn AttributionStore> {
        self.recorder.store()
    }

    /// Attribute one conversion's revenue across the customer's journey and
    /// record the result. `window_override` narrows or widens the model's
    /// attribution window for this call only.
    pub fn analyze_conversion(
        &self,
        customer_id: &str,
        conversion: &ConversionData,
        model_ref: &ModelRef,
        window_override: Option<u32>,
    ) -> EngineResult<RevenueAttribution> {
        validate_conversion(customer_id, conversion)?;

        // Snapshot the model once; concurrent registry edits cannot affect
        // this calculation past this point.
        let model = self.registry.resolve(model_ref)?;
        let window_days = window_override.unwrap_or(model.attribution_window_days);
        if window_days == 0 {
            return Err(AttributionError::InvalidInput(
                "attribution window must be positive".to_string(),
            ));
        }

        let lookback_days = model.lookback_window_days.max(window_days);
        let lookback_start = conversion.conversion_date - Duration::days(lookback_days as i64);
        let mut touchpoints = self.touchpoints.get_touchpoints(
            customer_id,
            lookback_start,
            conversion.conversion_date,
        )?;

        let window_start = conversion.conversion_date - Duration::days(window_days as i64);
        touchpoints.retain(|t| t.timestamp >= window_start);
        calculator::sort_journey(&mut touchpoints);
        if touchpoints.len() > self.config.max_touchpoints_per_journey {
            // Keep the most recent portion of an oversized journey.
            let excess = touchpoints.len() - self.config.max_touchpoints_per_journey;
            touchpoints.drain(..excess);
        }

        debug!(
            customer_id = %customer_id,
            conversion_id = %conversion.conversion_id,
            touchpoints = touchpoints.len(),
            window_days,
            "journey assembled"
        );

        let record = if touchpoints.is_empty() {
            self.direct_fallback(customer_id, conversion, &model, window_days)
        } else {
            let rows = calculator::compute(
                &touchpoints,
                conversion.value,
                conversion.conversion_date,
                &model,
            )?;
            let score = confidence::estimate(&rows, model.model_type);
            build_record(customer_id, conversion, &model, window_days, rows, score)
        };

        self.recorder.record(record.clone())?;
        info!(
            customer_id = %customer_id,
            conversion_id = %conversion.conversion_id,
            model = %record.model_key,
            value = conversion.value,
            confidence = record.confidence,
            "conversion attributed"
        );
        Ok(record)
    }

    pub fn get_attribution(&self, id: &Uuid) -> Option<RevenueAttribution> {
        self.recorder.store().get(id)
    }

    pub fn create_custom_model(&self, config: CustomModelConfig) -> EngineResult<Uuid> {
        self.registry.create_custom(config)
    }

    pub fn list_models(&self) -> Vec<AttributionModel> {
        self.registry.list_models()
    }

    /// No touchpoints inside the window: credit everything to a synthetic
    /// direct touchpoint at the conversion instant, confidence fixed at 1.0.
    fn direct_fallback(
        &self,
        customer_id: &str,
        conversion: &ConversionData,
        model: &AttributionModel,
        window_days: u32,
    ) -> RevenueAttribution {
        debug!(
            customer_id = %customer_id,
            conversion_id = %conversion.conversion_id,
            "no touchpoints in window, applying direct attribution fallback"
        );
        let synthetic = Touchpoint {
            id: Uuid::new_v4(),
            customer_id: customer_id.to_string(),
            touchpoint_type: TouchpointType::Direct,
            channel: None,
            campaign_id: None,
            campaign_name: None,
            source: None,
            medium: None,
            content: None,
            timestamp: conversion.conversion_date,
        };
        let rows = vec![ComputedTouchpoint {
            touchpoint: synthetic,
            attributed_revenue: conversion.value,
            attribution_percentage: 100.0,
            attribution_weight: 1.0,
            position_in_journey: 1,
            days_before_conversion: 0,
        }];
        build_record(
            customer_id,
            conversion,
            model,
            window_days,
            rows,
            confidence::DIRECT_FALLBACK_CONFIDENCE,
        )
    }
}

fn validate_conversion(customer_id: &str, conversion: &ConversionData) -> EngineResult<()> {
    if customer_id.trim().is_empty() {
        return Err(AttributionError::InvalidInput(
            "customer_id must not be empty".to_string(),
        ));
    }
    if conversion.conversion_id.trim().is_empty() {
        return Err(AttributionError::InvalidInput(
            "conversion_id must not be empty".to_string(),
        ));
    }
    if !(conversion.value > 0.0) || !conversion.value.is_finite() {
        return Err(AttributionError::InvalidInput(format!(
            "conversion value must be positive, got {}",
            conversion.value
        )));
    }
    Ok(())
}

/// Shape calculator output into the immutable parent record with embedded
/// children, revenue breakdown, and primary attribution.
fn build_record(
    customer_id: &str,
    conversion: &ConversionData,
    model: &AttributionModel,
    window_days: u32,
    rows: Vec<ComputedTouchpoint>,
    confidence: f64,
) -> RevenueAttribution {
    let attribution_id = Uuid::new_v4();
    let journey_summary = journey::summarize(&rows);

    let mut revenue_breakdown: HashMap<String, f64> = HashMap::new();
    for row in &rows {
        *revenue_breakdown
            .entry(row.touchpoint.touchpoint_type.as_str().to_string())
            .or_insert(0.0) += row.attributed_revenue;
    }

    let primary_attribution = rows
        .iter()
        .max_by(|a, b| {
            a.attributed_revenue
                .partial_cmp(&b.attributed_revenue)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|row| PrimaryAttribution {
            touchpoint_id: row.touchpoint.id,
            touchpoint_type: row.touchpoint.touchpoint_type,
            channel: row.touchpoint.channel.clone(),
            attributed_revenue: row.attributed_revenue,
            position_in_journey: row.position_in_journey,
        });

    let touchpoint_attributions = rows
        .into_iter()
        .map(|row| TouchpointAttribution {
            id: Uuid::new_v4(),
            attribution_id,
            touchpoint_id: row.touchpoint.id,
            touchpoint_type: row.touchpoint.touchpoint_type,
            channel: row.touchpoint.channel,
            campaign_id: row.touchpoint.campaign_id,
            attributed_revenue: row.attributed_revenue,
            attribution_percentage: row.attribution_percentage,
            attribution_weight: row.attribution_weight,
            position_in_journey: row.position_in_journey,
            days_before_conversion: row.days_before_conversion,
        })
        .collect::<Vec<_>>();

    RevenueAttribution {
        id: attribution_id,
        customer_id: customer_id.to_string(),
        conversion_id: conversion.conversion_id.clone(),
        conversion_type: conversion.conversion_type.clone(),
        conversion_value: conversion.value,
        conversion_date: conversion.conversion_date,
        model_key: model.model_key(),
        touchpoints_analyzed: touchpoint_attributions.len(),
        attribution_window_days: window_days,
        revenue_breakdown,
        primary_attribution,
        journey_summary,
        confidence,
        touchpoint_attributions,
        computed_at: Utc::now(),
    }
}
