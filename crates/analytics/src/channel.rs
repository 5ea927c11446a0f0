//! Channel performance — per-channel revenue rollups with a
//! first / last / assisted split, computed on demand from stored
//! touchpoint attributions.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use attribution_core::types::RevenueAttribution;

/// Read-only aggregate for one channel over a requested period. Not stored;
/// recomputed from the attribution records on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelPerformance {
    /// Explicit channel, or the touchpoint type identifier when absent.
    pub channel: String,
    pub total_revenue: f64,
    /// Distinct conversions (by conversion id) with at least one touchpoint
    /// here. A conversion attributed under several models counts once, the
    /// same as in campaign reports.
    pub conversions: u64,
    pub avg_attribution_percentage: f64,
    /// Revenue from touchpoints that opened journeys.
    pub first_touch_revenue: f64,
    /// Revenue from touchpoints that closed journeys.
    pub last_touch_revenue: f64,
    /// Revenue from everything in between.
    pub assisted_revenue: f64,
}

#[derive(Default)]
struct ChannelAccumulator {
    total_revenue: f64,
    conversion_ids: HashSet<String>,
    percentage_sum: f64,
    touchpoint_count: u64,
    first_touch_revenue: f64,
    last_touch_revenue: f64,
    assisted_revenue: f64,
}

/// Aggregate channel performance over a set of attribution records, sorted
/// by total revenue descending.
pub(crate) fn build_performance(records: &[RevenueAttribution]) -> Vec<ChannelPerformance> {
    let mut channels: HashMap<String, ChannelAccumulator> = HashMap::new();

    for record in records {
        let journey_len = record.journey_summary.touchpoint_count as u32;
        for child in &record.touchpoint_attributions {
            let acc = channels.entry(child.channel_label()).or_default();
            acc.total_revenue += child.attributed_revenue;
            acc.conversion_ids.insert(record.conversion_id.clone());
            acc.percentage_sum += child.attribution_percentage;
            acc.touchpoint_count += 1;
            if child.position_in_journey == 1 {
                acc.first_touch_revenue += child.attributed_revenue;
            } else if child.position_in_journey == journey_len {
                acc.last_touch_revenue += child.attributed_revenue;
            } else {
                acc.assisted_revenue += child.attributed_revenue;
            }
        }
    }

    let mut performance: Vec<ChannelPerformance> = channels
        .into_iter()
        .map(|(channel, acc)| ChannelPerformance {
            channel,
            total_revenue: acc.total_revenue,
            conversions: acc.conversion_ids.len() as u64,
            avg_attribution_percentage: if acc.touchpoint_count > 0 {
                acc.percentage_sum / acc.touchpoint_count as f64
            } else {
                0.0
            },
            first_touch_revenue: acc.first_touch_revenue,
            last_touch_revenue: acc.last_touch_revenue,
            assisted_revenue: acc.assisted_revenue,
        })
        .collect();

    performance.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.channel.cmp(&b.channel))
    });
    performance
}
