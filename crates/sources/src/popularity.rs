//! Popularity fallback
//!
//! The non-personalized ranking every other source falls back to when it has
//! no signal to work with.

use crate::types::{rank, Recommendation, RecommendationMethod};
use data_loader::{CatalogStore, MovieAccessor};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct PopularitySource {
    store: Arc<dyn CatalogStore>,
}

impl PopularitySource {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Movies by popularity descending (ties by id), scored `popularity / 100`
    pub fn get_recommendations(&self, limit: usize) -> Vec<Recommendation> {
        let recommendations = self
            .store
            .all_movies_brief()
            .into_iter()
            .map(|movie| {
                Recommendation::new(
                    movie.id,
                    RecommendationMethod::Popularity,
                    f64::from(movie.popularity) / 100.0,
                )
            })
            .collect();

        let ranked = rank(recommendations, limit);
        debug!("Generated {} popularity recommendations", ranked.len());
        ranked
    }
}
