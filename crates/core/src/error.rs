use thiserror::Error;

pub type EngineResult<T> = Result<T, AttributionError>;

#[derive(Error, Debug)]
pub enum AttributionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid model configuration: {0}")]
    InvalidModelConfiguration(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Empty journey: attribution requires at least one touchpoint")]
    EmptyJourney,

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Attribution already recorded for conversion {conversion_id} with model {model}")]
    DuplicateAttribution {
        conversion_id: String,
        model: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AttributionError {
    /// Whether the caller may safely retry the whole operation. Duplicate
    /// detection is recoverable but retrying it verbatim will not succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AttributionError::UpstreamUnavailable(_) | AttributionError::Persistence(_)
        )
    }
}
