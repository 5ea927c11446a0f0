//! Journey summarization — derives the shape of the path to conversion
//! that is stored alongside each attribution record.

use std::collections::HashSet;

use attribution_core::types::{JourneyComplexity, JourneySummary, Touchpoint};

use crate::calculator::ComputedTouchpoint;

/// Summarize a computed journey. Touchpoints are already in chronological
/// order with positions assigned.
pub fn summarize(touchpoints: &[ComputedTouchpoint]) -> JourneySummary {
    let journey_length_days = touchpoints
        .iter()
        .map(|t| t.days_before_conversion)
        .max()
        .unwrap_or(0);

    let channels: HashSet<String> = touchpoints
        .iter()
        .map(|t| t.touchpoint.channel_label())
        .collect();
    let campaigns: HashSet<&String> = touchpoints
        .iter()
        .filter_map(|t| t.touchpoint.campaign_id.as_ref())
        .collect();

    JourneySummary {
        touchpoint_count: touchpoints.len(),
        journey_length_days,
        unique_channels: channels.len(),
        unique_campaigns: campaigns.len(),
        channel_sequence: touchpoints
            .iter()
            .map(|t| t.touchpoint.channel_label())
            .collect(),
        avg_days_between_touchpoints: average_gap_days(
            &touchpoints.iter().map(|t| &t.touchpoint).collect::<Vec<_>>(),
        ),
        complexity: JourneyComplexity::from_touchpoint_count(touchpoints.len()),
    }
}

/// Mean gap in days between consecutive touchpoints; 0 for journeys with
/// fewer than two touchpoints.
fn average_gap_days(touchpoints: &[&Touchpoint]) -> f64 {
    if touchpoints.len() < 2 {
        return 0.0;
    }
    let total_gap_secs: i64 = touchpoints
        .windows(2)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds())
        .sum();
    total_gap_secs as f64 / 86_400.0 / (touchpoints.len() - 1) as f64
}
