//! Model comparison — groups recorded attributions by model and recommends
//! the strongest performers. Never recomputes attribution; results from
//! different models for the same conversion coexist by design.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use attribution_core::types::RevenueAttribution;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelComparisonEntry {
    pub model_key: String,
    pub conversions: u64,
    pub total_revenue: f64,
    pub avg_revenue_per_conversion: f64,
    pub unique_customers: u64,
    pub avg_touchpoints_per_conversion: f64,
    /// Share of total revenue across all models in this comparison, 0–100.
    pub revenue_share_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelComparison {
    pub campaign_id: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Sorted by total revenue descending.
    pub models: Vec<ModelComparisonEntry>,
    /// Active model with the highest total attributed revenue.
    pub recommended_by_total_revenue: Option<String>,
    /// Active model with the highest average revenue per conversion. May
    /// differ from the total-revenue recommendation.
    pub recommended_by_avg_revenue: Option<String>,
    pub message: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Default)]
struct ModelAccumulator {
    conversions: u64,
    total_revenue: f64,
    customers: HashSet<String>,
    touchpoints: u64,
}

/// Build the comparison. `is_active` reports whether a model key is
/// currently active; inactive models stay in the table but are excluded
/// from recommendations.
pub(crate) fn build_comparison(
    campaign_id: Option<&str>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    records: &[RevenueAttribution],
    is_active: impl Fn(&str) -> bool,
) -> ModelComparison {
    let mut groups: HashMap<String, ModelAccumulator> = HashMap::new();

    for record in records {
        if let Some(campaign) = campaign_id {
            let touches_campaign = record
                .touchpoint_attributions
                .iter()
                .any(|t| t.campaign_id.as_deref() == Some(campaign));
            if !touches_campaign {
                continue;
            }
        }
        let acc = groups.entry(record.model_key.clone()).or_default();
        acc.conversions += 1;
        acc.total_revenue += record.conversion_value;
        acc.customers.insert(record.customer_id.clone());
        acc.touchpoints += record.touchpoints_analyzed as u64;
    }

    if groups.is_empty() {
        return ModelComparison {
            campaign_id: campaign_id.map(String::from),
            start,
            end,
            models: vec![],
            recommended_by_total_revenue: None,
            recommended_by_avg_revenue: None,
            message: Some("no data".to_string()),
            generated_at: Utc::now(),
        };
    }

    let grand_total: f64 = groups.values().map(|g| g.total_revenue).sum();
    let mut models: Vec<ModelComparisonEntry> = groups
        .into_iter()
        .map(|(model_key, acc)| ModelComparisonEntry {
            model_key,
            conversions: acc.conversions,
            total_revenue: acc.total_revenue,
            avg_revenue_per_conversion: acc.total_revenue / acc.conversions as f64,
            unique_customers: acc.customers.len() as u64,
            avg_touchpoints_per_conversion: acc.touchpoints as f64 / acc.conversions as f64,
            revenue_share_percent: if grand_total > 0.0 {
                acc.total_revenue / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    models.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.model_key.cmp(&b.model_key))
    });

    let active: Vec<&ModelComparisonEntry> =
        models.iter().filter(|m| is_active(&m.model_key)).collect();
    let recommended_by_total_revenue = active
        .iter()
        .max_by(|a, b| {
            a.total_revenue
                .partial_cmp(&b.total_revenue)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|m| m.model_key.clone());
    let recommended_by_avg_revenue = active
        .iter()
        .max_by(|a, b| {
            a.avg_revenue_per_conversion
                .partial_cmp(&b.avg_revenue_per_conversion)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|m| m.model_key.clone());

    ModelComparison {
        campaign_id: campaign_id.map(String::from),
        start,
        end,
        models,
        recommended_by_total_revenue,
        recommended_by_avg_revenue,
        message: None,
        generated_at: Utc::now(),
    }
}
