//! Confidence estimator — scores how representative an attribution result
//! is likely to be, from journey shape and model choice alone.

use attribution_core::model::ModelType;

use crate::calculator::ComputedTouchpoint;

/// Confidence assigned to the direct-attribution fallback: with no observed
/// touchpoints there is nothing to second-guess.
pub const DIRECT_FALLBACK_CONFIDENCE: f64 = 1.0;

/// Estimate a confidence score in [0, 1] for one computed attribution.
///
/// Base score falls as journeys get longer (more touchpoints mean more ways
/// to misassign credit); very long or same-day journeys are discounted;
/// single-touch models are discounted because they ignore most of the
/// journey, while data-driven gets a small bonus.
pub fn estimate(touchpoints: &[ComputedTouchpoint], model_type: ModelType) -> f64 {
    if touchpoints.is_empty() {
        return DIRECT_FALLBACK_CONFIDENCE;
    }

    let mut score: f64 = match touchpoints.len() {
        1 => 0.9,
        2..=3 => 0.8,
        4..=7 => 0.7,
        _ => 0.6,
    };

    let journey_length_days = touchpoints
        .iter()
        .map(|t| t.days_before_conversion)
        .max()
        .unwrap_or(0);
    if journey_length_days > 60 {
        score *= 0.8;
    } else if journey_length_days < 1 {
        score *= 0.9;
    }

    match model_type {
        ModelType::DataDriven => score = (score + 0.1).min(1.0),
        ModelType::FirstTouch | ModelType::LastTouch => score *= 0.85,
        _ => {}
    }

    score.clamp(0.0, 1.0)
}
