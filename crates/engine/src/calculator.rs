//! Attribution calculator — pure weight computation over an ordered journey.
//!
//! Given touchpoints sorted ascending by timestamp (ties broken by id), a
//! positive conversion value, and a model snapshot, produces one attribution
//! row per touchpoint. Revenue conservation holds for every model:
//! attributed revenue sums to the conversion value and percentages to 100.

use chrono::{DateTime, Utc};
use tracing::warn;

use attribution_core::error::{AttributionError, EngineResult};
use attribution_core::model::{AttributionModel, ModelType, PositionWeights};
use attribution_core::types::Touchpoint;

/// One row of calculator output, before it is shaped into a stored record.
#[derive(Debug, Clone)]
pub struct ComputedTouchpoint {
    pub touchpoint: Touchpoint,
    pub attributed_revenue: f64,
    pub attribution_percentage: f64,
    pub attribution_weight: f64,
    pub position_in_journey: u32,
    pub days_before_conversion: u32,
}

/// Sort touchpoints chronologically, breaking timestamp ties by id so
/// repeated runs over the same journey are deterministic.
pub fn sort_journey(touchpoints: &mut [Touchpoint]) {
    touchpoints.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
}

/// Whole days between a touchpoint and the conversion, floored at zero.
pub fn days_before_conversion(touchpoint: &Touchpoint, conversion_date: DateTime<Utc>) -> u32 {
    (conversion_date - touchpoint.timestamp).num_days().max(0) as u32
}

/// Compute per-touchpoint attribution for one conversion.
///
/// Pure and deterministic: identical inputs yield bit-identical output. The
/// caller is responsible for window filtering, ordering, and the
/// direct-attribution fallback for empty journeys.
pub fn compute(
    touchpoints: &[Touchpoint],
    conversion_value: f64,
    conversion_date: DateTime<Utc>,
    model: &AttributionModel,
) -> EngineResult<Vec<ComputedTouchpoint>> {
    if touchpoints.is_empty() {
        return Err(AttributionError::EmptyJourney);
    }
    model.validate()?;

    let days: Vec<u32> = touchpoints
        .iter()
        .map(|t| days_before_conversion(t, conversion_date))
        .collect();

    let weights = match model.model_type {
        ModelType::FirstTouch => first_touch_weights(touchpoints.len()),
        ModelType::LastTouch => last_touch_weights(touchpoints.len()),
        ModelType::Linear => linear_weights(touchpoints.len()),
        ModelType::TimeDecay => time_decay_weights(&days, model.time_decay_rate),
        ModelType::PositionBased => {
            position_based_weights(touchpoints.len(), &model.position_weights)
        }
        ModelType::Custom => custom_weights(touchpoints, model),
        ModelType::DataDriven => {
            warn!(
                model = %model.name,
                "data_driven attribution is not implemented, applying linear weights"
            );
            linear_weights(touchpoints.len())
        }
    };

    Ok(touchpoints
        .iter()
        .zip(weights)
        .zip(days)
        .enumerate()
        .map(|(i, ((touchpoint, weight), days))| ComputedTouchpoint {
            touchpoint: touchpoint.clone(),
            attributed_revenue: conversion_value * weight,
            attribution_percentage: weight * 100.0,
            attribution_weight: weight,
            position_in_journey: (i + 1) as u32,
            days_before_conversion: days,
        })
        .collect())
}

fn first_touch_weights(n: usize) -> Vec<f64> {
    let mut weights = vec![0.0; n];
    weights[0] = 1.0;
    weights
}

fn last_touch_weights(n: usize) -> Vec<f64> {
    let mut weights = vec![0.0; n];
    weights[n - 1] = 1.0;
    weights
}

fn linear_weights(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

/// Each touchpoint gets `rate^days` raw weight, normalized. With rate in
/// (0, 1), touchpoints closer to the conversion carry more weight.
///
/// Exponents are taken relative to the most recent touchpoint: the ratios
/// are unchanged, and the raw total is always at least 1.0, so distant
/// journeys cannot underflow every weight to zero.
fn time_decay_weights(days: &[u32], rate: f64) -> Vec<f64> {
    let min_days = days.iter().copied().min().unwrap_or(0);
    let raw: Vec<f64> = days
        .iter()
        .map(|d| rate.powi((*d - min_days) as i32))
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

fn position_based_weights(n: usize, position: &PositionWeights) -> Vec<f64> {
    match n {
        1 => vec![1.0],
        2 => vec![0.5, 0.5],
        _ => {
            let middle_each = position.middle / (n - 2) as f64;
            let mut weights = vec![middle_each; n];
            weights[0] = position.first;
            weights[n - 1] = position.last;
            weights
        }
    }
}

/// Look up each touchpoint's type weight (missing types default to 0) and
/// renormalize. A journey where every weight is zero falls back to linear so
/// revenue is still fully assigned.
fn custom_weights(touchpoints: &[Touchpoint], model: &AttributionModel) -> Vec<f64> {
    let raw: Vec<f64> = touchpoints
        .iter()
        .map(|t| {
            model
                .touchpoint_weights
                .get(&t.touchpoint_type)
                .copied()
                .unwrap_or(0.0)
        })
        .collect();
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return linear_weights(touchpoints.len());
    }
    raw.into_iter().map(|w| w / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    use attribution_core::types::TouchpointType;

    const EPS: f64 = 1e-6;

    fn touchpoint(tp_type: TouchpointType, days_ago: i64, now: DateTime<Utc>) -> Touchpoint {
        Touchpoint {
            id: Uuid::new_v4(),
            customer_id: "cust-1".to_string(),
            touchpoint_type: tp_type,
            channel: None,
            campaign_id: Some("camp-1".to_string()),
            campaign_name: None,
            source: None,
            medium: None,
            content: None,
            timestamp: now - Duration::days(days_ago),
        }
    }

    /// The worked journey from the product scenarios: paid search 10 days
    /// out, email 3 days out, direct on the conversion day.
    fn scenario_journey(now: DateTime<Utc>) -> Vec<Touchpoint> {
        vec![
            touchpoint(TouchpointType::PaidSearch, 10, now),
            touchpoint(TouchpointType::Email, 3, now),
            touchpoint(TouchpointType::Direct, 0, now),
        ]
    }

    fn assert_conserved(rows: &[ComputedTouchpoint], conversion_value: f64) {
        let revenue: f64 = rows.iter().map(|r| r.attributed_revenue).sum();
        let percent: f64 = rows.iter().map(|r| r.attribution_percentage).sum();
        assert!(
            (revenue - conversion_value).abs() / conversion_value < EPS,
            "revenue {revenue} != {conversion_value}"
        );
        assert!((percent - 100.0).abs() < EPS, "percent {percent} != 100");
    }

    #[test]
    fn test_revenue_conservation_all_models() {
        let now = Utc::now();
        let journey = scenario_journey(now);
        for model_type in ModelType::standard_types() {
            let model = AttributionModel::standard(model_type);
            let rows = compute(&journey, 499.99, now, &model).unwrap();
            assert_conserved(&rows, 499.99);
        }
    }

    #[test]
    fn test_first_touch_gets_everything() {
        let now = Utc::now();
        let journey = scenario_journey(now);
        let model = AttributionModel::standard(ModelType::FirstTouch);
        let rows = compute(&journey, 300.0, now, &model).unwrap();
        assert!((rows[0].attributed_revenue - 300.0).abs() < EPS);
        assert!((rows[0].attribution_percentage - 100.0).abs() < EPS);
        assert_eq!(rows[0].position_in_journey, 1);
        assert!(rows[1].attributed_revenue.abs() < EPS);
        assert!(rows[2].attributed_revenue.abs() < EPS);
    }

    #[test]
    fn test_last_touch_gets_everything() {
        let now = Utc::now();
        let journey = scenario_journey(now);
        let model = AttributionModel::standard(ModelType::LastTouch);
        let rows = compute(&journey, 300.0, now, &model).unwrap();
        assert!(rows[0].attributed_revenue.abs() < EPS);
        assert!(rows[1].attributed_revenue.abs() < EPS);
        assert!((rows[2].attributed_revenue - 300.0).abs() < EPS);
    }

    #[test]
    fn test_linear_even_split() {
        let now = Utc::now();
        let journey: Vec<Touchpoint> = (0..4)
            .map(|i| touchpoint(TouchpointType::Email, i, now))
            .collect();
        let model = AttributionModel::standard(ModelType::Linear);
        let rows = compute(&journey, 200.0, now, &model).unwrap();
        for row in &rows {
            assert!((row.attributed_revenue - 50.0).abs() < EPS);
            assert!((row.attribution_percentage - 25.0).abs() < EPS);
        }
    }

    #[test]
    fn test_position_based_boundaries() {
        let now = Utc::now();
        let model = AttributionModel::standard(ModelType::PositionBased);

        let single = vec![touchpoint(TouchpointType::Direct, 0, now)];
        let rows = compute(&single, 100.0, now, &model).unwrap();
        assert!((rows[0].attribution_percentage - 100.0).abs() < EPS);

        let pair = vec![
            touchpoint(TouchpointType::Email, 2, now),
            touchpoint(TouchpointType::Direct, 0, now),
        ];
        let rows = compute(&pair, 100.0, now, &model).unwrap();
        assert!((rows[0].attribution_percentage - 50.0).abs() < EPS);
        assert!((rows[1].attribution_percentage - 50.0).abs() < EPS);

        let five: Vec<Touchpoint> = (0..5)
            .map(|i| touchpoint(TouchpointType::Email, 5 - i, now))
            .collect();
        let rows = compute(&five, 100.0, now, &model).unwrap();
        assert!((rows[0].attribution_percentage - 40.0).abs() < EPS);
        assert!((rows[4].attribution_percentage - 40.0).abs() < EPS);
        for row in &rows[1..4] {
            assert!((row.attribution_percentage - 20.0 / 3.0).abs() < EPS);
        }
    }

    #[test]
    fn test_position_based_scenario() {
        // paid_search @10d, email @3d, direct @0d, $300: 40% / 20% / 40%.
        let now = Utc::now();
        let journey = scenario_journey(now);
        let model = AttributionModel::standard(ModelType::PositionBased);
        let rows = compute(&journey, 300.0, now, &model).unwrap();
        assert!((rows[0].attributed_revenue - 120.0).abs() < EPS);
        assert!((rows[1].attributed_revenue - 60.0).abs() < EPS);
        assert!((rows[2].attributed_revenue - 120.0).abs() < EPS);
    }

    #[test]
    fn test_time_decay_scenario() {
        // Weights proportional to 0.5^10 : 0.5^3 : 0.5^0.
        let now = Utc::now();
        let journey = scenario_journey(now);
        let model = AttributionModel::standard(ModelType::TimeDecay);
        let rows = compute(&journey, 300.0, now, &model).unwrap();

        let total_raw = 0.5f64.powi(10) + 0.5f64.powi(3) + 1.0;
        assert!((rows[0].attributed_revenue - 300.0 * 0.5f64.powi(10) / total_raw).abs() < EPS);
        assert!((rows[1].attributed_revenue - 300.0 * 0.125 / total_raw).abs() < EPS);
        assert!((rows[2].attributed_revenue - 300.0 / total_raw).abs() < EPS);
        assert_conserved(&rows, 300.0);

        // Roughly $0.26 / $33.3 / $266.4.
        assert!(rows[0].attributed_revenue < 0.3);
        assert!((rows[1].attributed_revenue - 33.3).abs() < 0.1);
        assert!((rows[2].attributed_revenue - 266.4).abs() < 0.1);
    }

    #[test]
    fn test_time_decay_monotonic_in_recency() {
        let now = Utc::now();
        let journey: Vec<Touchpoint> = (0..6)
            .map(|i| touchpoint(TouchpointType::Email, 20 - i * 3, now))
            .collect();
        let model = AttributionModel::standard(ModelType::TimeDecay);
        let rows = compute(&journey, 1000.0, now, &model).unwrap();
        for pair in rows.windows(2) {
            // Later touchpoints (fewer days out) never earn less.
            assert!(pair[1].attributed_revenue >= pair[0].attributed_revenue);
        }
    }

    #[test]
    fn test_time_decay_distant_journey_still_conserves() {
        // rate^days underflows to zero beyond ~1075 days at rate 0.5; the
        // relative exponents keep the split finite and conserved.
        let now = Utc::now();
        let journey = vec![
            touchpoint(TouchpointType::PaidSearch, 1101, now),
            touchpoint(TouchpointType::Email, 1100, now),
        ];
        let model = AttributionModel::standard(ModelType::TimeDecay);
        let rows = compute(&journey, 300.0, now, &model).unwrap();
        for row in &rows {
            assert!(row.attributed_revenue.is_finite());
        }
        assert_conserved(&rows, 300.0);
        // One day apart at rate 0.5: a 1:2 split.
        assert!((rows[0].attributed_revenue - 100.0).abs() < EPS);
        assert!((rows[1].attributed_revenue - 200.0).abs() < EPS);
    }

    #[test]
    fn test_custom_weights_renormalized() {
        let now = Utc::now();
        let journey = scenario_journey(now);
        let mut model = AttributionModel::standard(ModelType::Custom);
        model.touchpoint_weights.insert(TouchpointType::PaidSearch, 3.0);
        model.touchpoint_weights.insert(TouchpointType::Email, 1.0);
        // direct has no configured weight, defaults to 0
        let rows = compute(&journey, 400.0, now, &model).unwrap();
        assert!((rows[0].attributed_revenue - 300.0).abs() < EPS);
        assert!((rows[1].attributed_revenue - 100.0).abs() < EPS);
        assert!(rows[2].attributed_revenue.abs() < EPS);
        assert_conserved(&rows, 400.0);
    }

    #[test]
    fn test_custom_all_zero_falls_back_to_linear() {
        let now = Utc::now();
        let journey = scenario_journey(now);
        let model = AttributionModel::standard(ModelType::Custom);
        let rows = compute(&journey, 300.0, now, &model).unwrap();
        for row in &rows {
            assert!((row.attributed_revenue - 100.0).abs() < EPS);
        }
    }

    #[test]
    fn test_data_driven_falls_back_to_linear() {
        let now = Utc::now();
        let journey = scenario_journey(now);
        let model = AttributionModel::standard(ModelType::DataDriven);
        let rows = compute(&journey, 300.0, now, &model).unwrap();
        for row in &rows {
            assert!((row.attributed_revenue - 100.0).abs() < EPS);
        }
    }

    #[test]
    fn test_empty_journey_rejected() {
        let model = AttributionModel::standard(ModelType::Linear);
        assert!(matches!(
            compute(&[], 100.0, Utc::now(), &model),
            Err(AttributionError::EmptyJourney)
        ));
    }

    #[test]
    fn test_deterministic_recomputation() {
        let now = Utc::now();
        let journey = scenario_journey(now);
        let model = AttributionModel::standard(ModelType::TimeDecay);
        let first = compute(&journey, 300.0, now, &model).unwrap();
        let second = compute(&journey, 300.0, now, &model).unwrap();
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.attributed_revenue.to_bits(), b.attributed_revenue.to_bits());
            assert_eq!(a.attribution_weight.to_bits(), b.attribution_weight.to_bits());
        }
    }

    #[test]
    fn test_sort_breaks_ties_by_id() {
        let now = Utc::now();
        let mut a = touchpoint(TouchpointType::Email, 1, now);
        let mut b = touchpoint(TouchpointType::Direct, 1, now);
        b.timestamp = a.timestamp;
        a.id = Uuid::from_u128(2);
        b.id = Uuid::from_u128(1);

        let mut journey = vec![a.clone(), b.clone()];
        sort_journey(&mut journey);
        assert_eq!(journey[0].id, b.id);
        assert_eq!(journey[1].id, a.id);
    }
}
