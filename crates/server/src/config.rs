//! Engine configuration
//!
//! Loaded from an optional TOML file. Every field has a default, so an empty
//! file (or no file) gives the stock engine:
//!
//! ```toml
//! [collaborative]
//! min_common_movies = 3
//! neighbor_limit = 50
//! liked_threshold = 7
//! per_neighbor_limit = 10
//! similar_per_seed = 5
//!
//! [hybrid]
//! content = 0.4
//! collaborative_user = 0.3
//! collaborative_item = 0.3
//!
//! [presets]
//! action_fan = ["Action", "Adventure", "Sci-Fi"]
//! ```
//!
//! A `[presets]` section replaces the built-in table outright.

use crate::error::{EngineError, Result};
use pipeline::HybridWeights;
use serde::Deserialize;
use sources::{CollaborativeSource, TastePresets};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub collaborative: CollaborativeConfig,
    pub hybrid: HybridWeights,
    pub presets: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollaborativeConfig {
    pub min_common_movies: usize,
    pub neighbor_limit: usize,
    pub liked_threshold: u8,
    pub per_neighbor_limit: usize,
    pub similar_per_seed: usize,
}

impl Default for CollaborativeConfig {
    fn default() -> Self {
        Self {
            min_common_movies: 3,
            neighbor_limit: 50,
            liked_threshold: 7,
            per_neighbor_limit: 10,
            similar_per_seed: 5,
        }
    }
}

impl CollaborativeConfig {
    /// Apply these settings to a source through its builder setters
    pub fn configure(&self, source: CollaborativeSource) -> CollaborativeSource {
        source
            .with_min_common_movies(self.min_common_movies)
            .with_neighbor_limit(self.neighbor_limit)
            .with_liked_threshold(self.liked_threshold)
            .with_per_neighbor_limit(self.per_neighbor_limit)
            .with_similar_per_seed(self.similar_per_seed)
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.hybrid.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// The preset table: the configured one, or the built-in defaults
    pub fn taste_presets(&self) -> Arc<TastePresets> {
        let presets = match &self.presets {
            Some(table) => TastePresets::from_map(table.clone()),
            None => TastePresets::default(),
        };
        Arc::new(presets)
    }
}
