use serde::Deserialize;

/// Engine configuration. Loaded from environment variables with the prefix
/// `ATTRIBUTION_ENGINE__` or constructed with defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributionConfig {
    #[serde(default = "default_attribution_window_days")]
    pub default_attribution_window_days: u32,
    #[serde(default = "default_lookback_window_days")]
    pub default_lookback_window_days: u32,
    #[serde(default = "default_time_decay_rate")]
    pub default_time_decay_rate: f64,
    #[serde(default = "default_position_first")]
    pub position_weight_first: f64,
    #[serde(default = "default_position_last")]
    pub position_weight_last: f64,
    #[serde(default = "default_position_middle")]
    pub position_weight_middle: f64,
    /// Guard against runaway journeys from misbehaving event feeds.
    #[serde(default = "default_max_touchpoints")]
    pub max_touchpoints_per_journey: usize,
}

fn default_attribution_window_days() -> u32 { crate::model::DEFAULT_ATTRIBUTION_WINDOW_DAYS }
fn default_lookback_window_days() -> u32 { crate::model::DEFAULT_LOOKBACK_WINDOW_DAYS }
fn default_time_decay_rate() -> f64 { crate::model::DEFAULT_TIME_DECAY_RATE }
fn default_position_first() -> f64 { 0.4 }
fn default_position_last() -> f64 { 0.4 }
fn default_position_middle() -> f64 { 0.2 }
fn default_max_touchpoints() -> usize { 500 }

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            default_attribution_window_days: default_attribution_window_days(),
            default_lookback_window_days: default_lookback_window_days(),
            default_time_decay_rate: default_time_decay_rate(),
            position_weight_first: default_position_first(),
            position_weight_last: default_position_last(),
            position_weight_middle: default_position_middle(),
            max_touchpoints_per_journey: default_max_touchpoints(),
        }
    }
}

impl AttributionConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("ATTRIBUTION_ENGINE")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
