//! Item Similarity Lookup
//!
//! Reads one row of the precomputed similarity matrix and resolves the
//! strongest entries back to catalog movies.

use crate::types::{Recommendation, RecommendationMethod};
use data_loader::{CatalogStore, MovieAccessor, MovieId, SimilarityAccessor};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct SimilarSource {
    store: Arc<dyn CatalogStore>,
}

impl SimilarSource {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// The `limit` strongest neighbours of a movie, as (movie, similarity)
    ///
    /// The self entry is excluded and equal values keep matrix row order.
    /// `limit` is applied before resolving ids, so entries without a movie
    /// id or catalog metadata shrink the result rather than being replaced.
    /// A movie absent from the artifact has no neighbours.
    pub fn similar_ids(&self, movie_id: MovieId, limit: usize) -> Vec<(MovieId, f32)> {
        let Some(self_index) = self.store.movie_id_to_index(movie_id) else {
            debug!("Movie {} has no similarity mapping", movie_id);
            return Vec::new();
        };
        let Some(row) = self.store.similarity_row(self_index) else {
            return Vec::new();
        };

        let mut entries: Vec<(usize, f32)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|(i, _)| *i != self_index)
            .collect();
        // sort_by is stable, so ties stay in row order
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        entries.truncate(limit);

        entries
            .into_iter()
            .filter_map(|(i, similarity)| {
                let neighbour = self.store.index_to_movie_id(i)?;
                self.store.movie_brief(neighbour)?;
                Some((neighbour, similarity))
            })
            .collect()
    }

    pub fn get_recommendations(&self, movie_id: MovieId, limit: usize) -> Vec<Recommendation> {
        self.similar_ids(movie_id, limit)
            .into_iter()
            .map(|(id, similarity)| {
                Recommendation::new(id, RecommendationMethod::Similarity, f64::from(similarity))
            })
            .collect()
    }
}
