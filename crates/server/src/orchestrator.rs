//! # Recommendation Orchestrator
//!
//! The engine's request surface. Each operation:
//! 1. Parses caller input (collaborative mode, weight overrides)
//! 2. Runs the CPU-bound scoring on tokio's blocking pool
//! 3. Joins the ranked ids with display metadata
//! 4. Logs a one-line summary with timing
//!
//! Hybrid runs its three inputs concurrently with `tokio::join!` and fuses
//! them once all three are back. Movies the user has rated are dropped from
//! the fused union, including any that a popularity fallback brought in.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument};

use crate::config::EngineConfig;
use crate::error::Result;
use data_loader::{CatalogStore, MovieAccessor, MovieId, UserId};
use pipeline::{HybridFusion, HybridWeights};
use sources::{
    CollaborativeMode, CollaborativeSource, ContentSource, PopularitySource, ProfileSource,
    Recommendation, RecommendationMethod, SimilarSource, UserProfile, build_user_context,
};

/// A recommended movie with its display fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f32,
    pub score: f64,
    pub method: RecommendationMethod,
}

/// A neighbour of a seed movie in the similarity artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarMovie {
    pub movie_id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f32,
    pub similarity: f64,
}

/// Coordinates the sources over one shared, immutable catalog
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    store: Arc<dyn CatalogStore>,
    content: ContentSource,
    collaborative: CollaborativeSource,
    popularity: PopularitySource,
    similar: SimilarSource,
    profile: ProfileSource,
    /// Configured blend, already rescaled to sum to 1
    weights: HybridWeights,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator with every source configured from `config`
    pub fn new(store: Arc<dyn CatalogStore>, config: EngineConfig) -> Result<Self> {
        let weights = config.hybrid.normalized()?;
        let collaborative = config
            .collaborative
            .configure(CollaborativeSource::new(Arc::clone(&store)));

        Ok(Self {
            content: ContentSource::new(Arc::clone(&store)),
            collaborative,
            popularity: PopularitySource::new(Arc::clone(&store)),
            similar: SimilarSource::new(Arc::clone(&store)),
            profile: ProfileSource::new(Arc::clone(&store), config.taste_presets()),
            weights,
            store,
        })
    }

    pub fn weights(&self) -> HybridWeights {
        self.weights
    }

    /// Unrated movies ranked by genre affinity to the user's profile
    #[instrument(skip(self))]
    pub async fn get_content_recommendations(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<MovieRecommendation>> {
        let start = Instant::now();

        let content = self.content.clone();
        let recs =
            tokio::task::spawn_blocking(move || content.get_recommendations(user_id, limit))
                .await?;

        let recommendations = self.enrich(recs);
        info!(
            "Content: {} recommendations for user {} in {:.2?}",
            recommendations.len(),
            user_id,
            start.elapsed()
        );
        Ok(recommendations)
    }

    /// Collaborative filtering; `mode` is "user" or "item"
    #[instrument(skip(self))]
    pub async fn get_collaborative_recommendations(
        &self,
        user_id: UserId,
        limit: usize,
        mode: &str,
    ) -> Result<Vec<MovieRecommendation>> {
        let mode: CollaborativeMode = mode.parse()?;
        let start = Instant::now();

        let recs = self.collaborative_blocking(user_id, limit, mode).await?;

        let recommendations = self.enrich(recs);
        info!(
            "Collaborative ({}): {} recommendations for user {} in {:.2?}",
            mode,
            recommendations.len(),
            user_id,
            start.elapsed()
        );
        Ok(recommendations)
    }

    /// Blend of content, user CF and item CF
    ///
    /// `weights` is an optional JSON override of the configured blend, e.g.
    /// `{"content": 0.6}`. Omitted keys keep their configured values.
    #[instrument(skip(self))]
    pub async fn get_hybrid_recommendations(
        &self,
        user_id: UserId,
        limit: usize,
        weights: Option<&str>,
    ) -> Result<Vec<MovieRecommendation>> {
        let weights = match weights {
            Some(json) => HybridWeights::from_json_over(json, self.weights)?,
            None => self.weights,
        };
        let start = Instant::now();
        let pool = limit.saturating_mul(2);

        let content = self.content.clone();
        let (content_recs, user_recs, item_recs) = tokio::join!(
            tokio::task::spawn_blocking(move || content.get_recommendations(user_id, pool)),
            self.collaborative_blocking(user_id, pool, CollaborativeMode::User),
            self.collaborative_blocking(user_id, pool, CollaborativeMode::Item),
        );
        let (content_recs, user_recs, item_recs) = (content_recs?, user_recs?, item_recs?);
        info!(
            "Hybrid inputs: content={}, user={}, item={}",
            content_recs.len(),
            user_recs.len(),
            item_recs.len()
        );

        let rated = build_user_context(&*self.store, user_id).rated_movies;
        let fused = HybridFusion::from_weights(&weights, content_recs, user_recs, item_recs)
            .excluding(rated)
            .fuse(limit);

        let recommendations = self.enrich(fused);
        info!(
            "Hybrid: {} recommendations for user {} in {:.2?}",
            recommendations.len(),
            user_id,
            start.elapsed()
        );
        Ok(recommendations)
    }

    /// Nearest movies to a seed in the similarity artifact
    #[instrument(skip(self))]
    pub async fn get_similar_movies(
        &self,
        movie_id: MovieId,
        limit: usize,
    ) -> Result<Vec<SimilarMovie>> {
        let similar = self.similar.clone();
        let recs =
            tokio::task::spawn_blocking(move || similar.get_recommendations(movie_id, limit))
                .await?;

        let movies: Vec<SimilarMovie> = recs
            .into_iter()
            .filter_map(|rec| {
                let movie = self.store.movie_brief(rec.movie_id)?;
                Some(SimilarMovie {
                    movie_id: movie.id,
                    title: movie.title,
                    poster_path: movie.poster_path,
                    release_date: movie.release_date,
                    vote_average: movie.vote_average,
                    similarity: rec.score,
                })
            })
            .collect();
        info!("Similar: {} movies for movie {}", movies.len(), movie_id);
        Ok(movies)
    }

    /// Movies by global popularity
    #[instrument(skip(self))]
    pub async fn get_popular_movies(&self, limit: usize) -> Result<Vec<MovieRecommendation>> {
        let popularity = self.popularity.clone();
        let recs =
            tokio::task::spawn_blocking(move || popularity.get_recommendations(limit)).await?;
        Ok(self.enrich(recs))
    }

    /// Movies for a taste preset; unknown presets get popular movies
    #[instrument(skip(self))]
    pub async fn get_profile_recommendations(
        &self,
        profile_name: &str,
        limit: usize,
    ) -> Result<Vec<MovieRecommendation>> {
        let profile = self.profile.clone();
        let name = profile_name.to_string();
        let recs =
            tokio::task::spawn_blocking(move || profile.get_recommendations(&name, limit))
                .await?;

        let recommendations = self.enrich(recs);
        info!(
            "Profile {:?}: {} recommendations",
            profile_name,
            recommendations.len()
        );
        Ok(recommendations)
    }

    /// The user's genre preference vector
    pub async fn get_user_profile(&self, user_id: UserId) -> Result<UserProfile> {
        let content = self.content.clone();
        Ok(tokio::task::spawn_blocking(move || content.user_profile(user_id)).await?)
    }

    async fn collaborative_blocking(
        &self,
        user_id: UserId,
        limit: usize,
        mode: CollaborativeMode,
    ) -> Result<Vec<Recommendation>> {
        let collaborative = self.collaborative.clone();
        let recs = tokio::task::spawn_blocking(move || {
            collaborative.get_recommendations(user_id, limit, mode)
        })
        .await?;
        Ok(recs)
    }

    /// Join ranked ids with display metadata. Ids missing from the catalog are dropped.
    fn enrich(&self, recs: Vec<Recommendation>) -> Vec<MovieRecommendation> {
        recs.into_iter()
            .filter_map(|rec| {
                let movie = self.store.movie_brief(rec.movie_id)?;
                Some(MovieRecommendation {
                    movie_id: movie.id,
                    title: movie.title,
                    poster_path: movie.poster_path,
                    release_date: movie.release_date,
                    vote_average: movie.vote_average,
                    score: rec.score,
                    method: rec.method,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use data_loader::{DataIndex, Movie, Rating};

    fn build_test_store() -> Arc<dyn CatalogStore> {
        let mut index = DataIndex::new();
        for id in 1..=4 {
            index.insert_movie(Movie {
                id,
                title: format!("Movie {}", id),
                year: Some(1999),
                release_date: Some("1999-03-31".to_string()),
                poster_path: Some(format!("/poster{}.jpg", id)),
                vote_average: 7.5,
                popularity: 10.0 * id as f32,
                genres: vec!["Sci-Fi".to_string()],
            });
        }
        index.insert_rating(Rating {
            user_id: 1,
            movie_id: 1,
            rating: 9,
            watched_at: 1_000_000,
            notes: None,
        });
        index.build_secondary_indices();
        Arc::new(index)
    }

    fn build_test_orchestrator() -> RecommendationOrchestrator {
        RecommendationOrchestrator::new(build_test_store(), EngineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_enrich_carries_display_fields() {
        let orchestrator = build_test_orchestrator();
        let recs = orchestrator.get_popular_movies(1).await.unwrap();

        assert_eq!(
            recs,
            vec![MovieRecommendation {
                movie_id: 4,
                title: "Movie 4".to_string(),
                poster_path: Some("/poster4.jpg".to_string()),
                release_date: Some("1999-03-31".to_string()),
                vote_average: 7.5,
                score: 0.4,
                method: RecommendationMethod::Popularity,
            }]
        );
    }

    #[test]
    fn test_enrich_drops_unknown_movies() {
        let orchestrator = build_test_orchestrator();
        let enriched = orchestrator.enrich(vec![
            Recommendation::new(2, RecommendationMethod::Content, 0.5),
            Recommendation::new(999, RecommendationMethod::Content, 0.4),
        ]);
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].movie_id, 2);
    }

    #[tokio::test]
    async fn test_invalid_mode_is_caller_error() {
        let orchestrator = build_test_orchestrator();
        let err = orchestrator
            .get_collaborative_recommendations(1, 5, "neighbours")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidMode(_)));
        assert!(err.is_caller_error());
    }

    #[tokio::test]
    async fn test_invalid_weights_are_caller_error() {
        let orchestrator = build_test_orchestrator();
        let err = orchestrator
            .get_hybrid_recommendations(1, 5, Some(r#"{"content": -1}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidWeights(_)));
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_new_rejects_bad_configured_weights() {
        let mut config = EngineConfig::default();
        config.hybrid = HybridWeights::new(0.0, 0.0, 0.0);
        let result = RecommendationOrchestrator::new(build_test_store(), config);
        assert!(matches!(result, Err(EngineError::InvalidWeights(_))));
    }

    #[tokio::test]
    async fn test_serializes_method_tag() {
        let orchestrator = build_test_orchestrator();
        let recs = orchestrator.get_content_recommendations(1, 1).await.unwrap();
        let json = serde_json::to_value(&recs[0]).unwrap();
        assert_eq!(json["method"], "content");
        assert_eq!(json["poster_path"], "/poster2.jpg");
    }
}
