//! Server crate for the ReelRecs recommendation engine.
//!
//! This crate contains the orchestrator that exposes the engine's
//! operations, the engine configuration and the engine error type.

pub mod config;
pub mod error;
pub mod orchestrator;

pub use config::{CollaborativeConfig, EngineConfig};
pub use error::{EngineError, Result};
pub use orchestrator::{MovieRecommendation, RecommendationOrchestrator, SimilarMovie};

pub use pipeline::HybridWeights;
pub use sources::UserProfile;
