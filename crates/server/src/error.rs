use pipeline::FusionError;
use sources::ParseModeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid mode: {0}")]
    InvalidMode(#[from] ParseModeError),

    #[error("Invalid weights: {0}")]
    InvalidWeights(#[from] FusionError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scoring task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl EngineError {
    /// Whether the caller sent bad input, as opposed to an engine failure
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidMode(_) | Self::InvalidWeights(_))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
