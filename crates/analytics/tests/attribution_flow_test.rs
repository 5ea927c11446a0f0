//! Integration test for the full attribution flow: raw platform events in,
//! per-model attribution records, and the analytics views over them.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use attribution_analytics::{AnalyticsEngine, Trend};
use attribution_core::config::AttributionConfig;
use attribution_core::model::ModelType;
use attribution_core::types::{ConversionData, TouchpointType};
use attribution_engine::providers::{MemoryTouchpointStore, RawPlatformEvent, StaticCostProvider};
use attribution_engine::recorder::{AttributionStore, MemoryAttributionStore};
use attribution_engine::registry::{ModelRef, ModelRegistry};
use attribution_engine::service::AttributionEngine;

const EPS: f64 = 1e-6;

fn raw_event(
    customer: &str,
    source: &str,
    medium: &str,
    campaign: Option<&str>,
    days_ago: i64,
) -> RawPlatformEvent {
    RawPlatformEvent {
        event_id: Uuid::new_v4(),
        customer_id: customer.to_string(),
        source: Some(source.to_string()),
        medium: Some(medium.to_string()),
        channel: None,
        campaign_id: campaign.map(String::from),
        campaign_name: None,
        content: None,
        timestamp: Utc::now() - Duration::days(days_ago),
    }
}

#[test]
fn test_full_attribution_flow() {
    let registry = Arc::new(ModelRegistry::new());
    let touchpoints = Arc::new(MemoryTouchpointStore::new());
    let store = Arc::new(MemoryAttributionStore::new());
    let costs = Arc::new(StaticCostProvider::new());
    costs.set_cost("summer-sale", 150.0);

    let engine = AttributionEngine::new(
        registry.clone(),
        touchpoints.clone(),
        store.clone(),
        AttributionConfig::default(),
    );
    let analytics = AnalyticsEngine::new(store.clone(), costs, registry);

    // Customer 1: paid search → email → direct over ten days.
    touchpoints.ingest(raw_event("cust-1", "google", "cpc", Some("summer-sale"), 10));
    touchpoints.ingest(raw_event("cust-1", "newsletter", "email", Some("summer-sale"), 3));
    touchpoints.ingest(raw_event("cust-1", "", "", None, 0));
    // Customer 2: a single social touch.
    touchpoints.ingest(raw_event("cust-2", "instagram", "social", Some("summer-sale"), 4));
    // Customer 3: nothing tracked, exercises the direct fallback.

    let now = Utc::now();
    let position = engine
        .analyze_conversion(
            "cust-1",
            &ConversionData {
                conversion_id: "conv-1".to_string(),
                conversion_type: "purchase".to_string(),
                value: 300.0,
                conversion_date: now,
            },
            &ModelRef::Standard(ModelType::PositionBased),
            None,
        )
        .unwrap();

    // 40/20/40 split of $300 across the three touchpoints.
    let revenues: Vec<f64> = position
        .touchpoint_attributions
        .iter()
        .map(|t| t.attributed_revenue)
        .collect();
    assert!((revenues[0] - 120.0).abs() < EPS);
    assert!((revenues[1] - 60.0).abs() < EPS);
    assert!((revenues[2] - 120.0).abs() < EPS);
    assert_eq!(
        position.touchpoint_attributions[0].touchpoint_type,
        TouchpointType::PaidSearch
    );

    engine
        .analyze_conversion(
            "cust-2",
            &ConversionData {
                conversion_id: "conv-2".to_string(),
                conversion_type: "signup".to_string(),
                value: 80.0,
                conversion_date: now,
            },
            &ModelRef::Standard(ModelType::LastTouch),
            None,
        )
        .unwrap();

    let fallback = engine
        .analyze_conversion(
            "cust-3",
            &ConversionData {
                conversion_id: "conv-3".to_string(),
                conversion_type: "purchase".to_string(),
                value: 50.0,
                conversion_date: now,
            },
            &ModelRef::Standard(ModelType::Linear),
            None,
        )
        .unwrap();
    assert!((fallback.confidence - 1.0).abs() < EPS);
    assert_eq!(
        fallback.touchpoint_attributions[0].touchpoint_type,
        TouchpointType::Direct
    );

    assert_eq!(store.len(), 3);

    // Channel totals conserve the full attributed revenue.
    let channels = analytics.channel_performance(now - Duration::days(30), now);
    let channel_total: f64 = channels.iter().map(|c| c.total_revenue).sum();
    assert!((channel_total - 430.0).abs() < EPS);

    // Campaign report covers cust-1's two campaign touchpoints (120 + 60)
    // and cust-2's single touch (80).
    let report = analytics
        .campaign_report("summer-sale", now - Duration::days(30), now)
        .unwrap();
    assert!((report.total_attributed_revenue - 260.0).abs() < EPS);
    assert_eq!(report.unique_conversions, 2);
    assert!((report.roi_percent - (260.0 - 150.0) / 150.0 * 100.0).abs() < EPS);
    assert!(matches!(
        report.trend,
        Trend::Increasing | Trend::Decreasing | Trend::InsufficientData
    ));

    // Three models recorded, all active, so both recommendations exist.
    let comparison = analytics.compare_models(None, now - Duration::days(30), now);
    assert_eq!(comparison.models.len(), 3);
    assert!(comparison.recommended_by_total_revenue.is_some());
    assert!(comparison.recommended_by_avg_revenue.is_some());
}
