use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    #[error("Malformed weights: {0}")]
    MalformedWeights(#[from] serde_json::Error),

    #[error("Weight {key} must be finite")]
    NonFiniteWeight { key: &'static str },

    #[error("Weight {key} must not be negative (got {value})")]
    NegativeWeight { key: &'static str, value: f64 },

    #[error("At least one weight must be positive")]
    AllZeroWeights,
}

pub type Result<T> = std::result::Result<T, FusionError>;
