//! Campaign reporting — revenue totals, model usage, position breakdowns,
//! a day-bucketed time series with trend classification, and ROI.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use attribution_core::types::RevenueAttribution;

/// Heuristic direction of a campaign's attributed revenue over the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    InsufficientData,
}

/// One day of attributed revenue for a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRevenuePoint {
    pub date: NaiveDate,
    pub revenue: f64,
    pub conversions: u64,
}

/// Revenue split by where in the journey the campaign's touchpoints sat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionBreakdown {
    pub first_touch_revenue: f64,
    pub middle_revenue: f64,
    pub last_touch_revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignReport {
    pub campaign_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_attributed_revenue: f64,
    /// Distinct conversions with at least one touchpoint in this campaign.
    pub unique_conversions: u64,
    pub avg_conversion_value: f64,
    /// Attribution record count per model key.
    pub model_usage: HashMap<String, u64>,
    pub position_breakdown: PositionBreakdown,
    pub time_series: Vec<DailyRevenuePoint>,
    pub trend: Trend,
    pub campaign_cost: f64,
    /// (revenue − cost) / cost × 100; 0 when cost is unknown.
    pub roi_percent: f64,
    pub message: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl CampaignReport {
    pub(crate) fn empty(campaign_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            campaign_id: campaign_id.to_string(),
            start,
            end,
            total_attributed_revenue: 0.0,
            unique_conversions: 0,
            avg_conversion_value: 0.0,
            model_usage: HashMap::new(),
            position_breakdown: PositionBreakdown::default(),
            time_series: vec![],
            trend: Trend::InsufficientData,
            campaign_cost: 0.0,
            roi_percent: 0.0,
            message: Some("no data".to_string()),
            generated_at: Utc::now(),
        }
    }
}

/// Build a campaign report from recorded attributions. `campaign_cost` comes
/// from the external cost lookup; 0 means unknown.
pub(crate) fn build_report(
    campaign_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    records: &[RevenueAttribution],
    campaign_cost: f64,
) -> CampaignReport {
    let mut total_revenue = 0.0;
    let mut touched: HashSet<&str> = HashSet::new();
    let mut conversion_values: Vec<f64> = Vec::new();
    let mut model_usage: HashMap<String, u64> = HashMap::new();
    let mut positions = PositionBreakdown::default();
    let mut daily: BTreeMap<NaiveDate, (f64, u64)> = BTreeMap::new();

    for record in records {
        let children: Vec<_> = record
            .touchpoint_attributions
            .iter()
            .filter(|t| t.campaign_id.as_deref() == Some(campaign_id))
            .collect();
        if children.is_empty() {
            continue;
        }

        let journey_len = record.journey_summary.touchpoint_count as u32;
        let mut campaign_revenue = 0.0;
        for child in &children {
            campaign_revenue += child.attributed_revenue;
            if child.position_in_journey == 1 {
                positions.first_touch_revenue += child.attributed_revenue;
            } else if child.position_in_journey == journey_len {
                positions.last_touch_revenue += child.attributed_revenue;
            } else {
                positions.middle_revenue += child.attributed_revenue;
            }
        }

        total_revenue += campaign_revenue;
        if touched.insert(record.conversion_id.as_str()) {
            conversion_values.push(record.conversion_value);
        }
        *model_usage.entry(record.model_key.clone()).or_insert(0) += 1;

        let day = record.conversion_date.date_naive();
        let entry = daily.entry(day).or_insert((0.0, 0));
        entry.0 += campaign_revenue;
        entry.1 += 1;
    }

    if touched.is_empty() {
        return CampaignReport::empty(campaign_id, start, end);
    }

    let time_series: Vec<DailyRevenuePoint> = daily
        .into_iter()
        .map(|(date, (revenue, conversions))| DailyRevenuePoint {
            date,
            revenue,
            conversions,
        })
        .collect();

    let avg_conversion_value =
        conversion_values.iter().sum::<f64>() / conversion_values.len() as f64;
    let roi_percent = if campaign_cost > 0.0 {
        (total_revenue - campaign_cost) / campaign_cost * 100.0
    } else {
        0.0
    };

    CampaignReport {
        campaign_id: campaign_id.to_string(),
        start,
        end,
        total_attributed_revenue: total_revenue,
        unique_conversions: touched.len() as u64,
        avg_conversion_value,
        model_usage,
        position_breakdown: positions,
        trend: classify_trend(&time_series),
        time_series,
        campaign_cost,
        roi_percent,
        message: None,
        generated_at: Utc::now(),
    }
}

/// Increasing when the second half of the day-sorted series out-earns the
/// first half; fewer than two distinct days is insufficient data.
fn classify_trend(series: &[DailyRevenuePoint]) -> Trend {
    if series.len() < 2 {
        return Trend::InsufficientData;
    }
    let mid = series.len() / 2;
    let first_half: f64 = series[..mid].iter().map(|p| p.revenue).sum();
    let second_half: f64 = series[mid..].iter().map(|p| p.revenue).sum();
    if second_half > first_half {
        Trend::Increasing
    } else {
        Trend::Decreasing
    }
}
