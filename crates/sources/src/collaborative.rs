//! Collaborative Filtering
//!
//! Two strategies over the ratings matrix:
//!
//! ## User-based
//! 1. Find users sharing at least `min_common_movies` rated movies
//! 2. Cosine similarity over the co-rated ratings only
//! 3. Keep the `neighbor_limit` most similar users
//! 4. Each neighbour contributes up to `per_neighbor_limit` of the movies
//!    they rated `liked_threshold` or higher, scored `rating * similarity`
//! 5. Duplicates keep their best score
//!
//! ## Item-based
//! For every movie the user rated, take its `similar_per_seed` nearest
//! movies from the similarity artifact and score them
//! `similarity * rating / 10`.
//!
//! Both fall back to popularity for a user without history. User-based also
//! falls back when no neighbour clears the co-rating threshold.

use crate::popularity::PopularitySource;
use crate::similar::SimilarSource;
use crate::types::{dedup_keep_max, rank, CollaborativeMode, Recommendation, RecommendationMethod};
use crate::user_context::{build_user_context, UserContext};
use data_loader::{CatalogStore, CoRatedUser, MovieAccessor, MovieId, RatingsAccessor, UserId};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A neighbour of the target user and how similar they are
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    pub user_id: UserId,
    pub similarity: f64,
}

#[derive(Clone)]
pub struct CollaborativeSource {
    store: Arc<dyn CatalogStore>,
    similar: SimilarSource,
    popularity: PopularitySource,

    /// Co-rated movies needed before a user counts as a neighbour
    min_common_movies: usize,

    /// Neighbours kept after ranking by similarity
    neighbor_limit: usize,

    /// Lowest rating that counts as a neighbour liking a movie
    liked_threshold: u8,

    /// Movies each neighbour may contribute
    per_neighbor_limit: usize,

    /// Similar movies looked up per rated movie in item mode
    similar_per_seed: usize,
}

impl CollaborativeSource {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            similar: SimilarSource::new(Arc::clone(&store)),
            popularity: PopularitySource::new(Arc::clone(&store)),
            store,
            min_common_movies: 3,
            neighbor_limit: 50,
            liked_threshold: 7,
            per_neighbor_limit: 10,
            similar_per_seed: 5,
        }
    }

    /// Configure minimum co-rated movies (default: 3)
    pub fn with_min_common_movies(mut self, min: usize) -> Self {
        self.min_common_movies = min;
        self
    }

    /// Configure how many neighbours are kept (default: 50)
    pub fn with_neighbor_limit(mut self, limit: usize) -> Self {
        self.neighbor_limit = limit;
        self
    }

    /// Configure the liked-rating threshold (default: 7)
    pub fn with_liked_threshold(mut self, threshold: u8) -> Self {
        self.liked_threshold = threshold;
        self
    }

    /// Configure movies contributed per neighbour (default: 10)
    pub fn with_per_neighbor_limit(mut self, limit: usize) -> Self {
        self.per_neighbor_limit = limit;
        self
    }

    /// Configure similar movies per seed in item mode (default: 5)
    pub fn with_similar_per_seed(mut self, count: usize) -> Self {
        self.similar_per_seed = count;
        self
    }

    #[instrument(skip(self))]
    pub fn get_recommendations(
        &self,
        user_id: UserId,
        limit: usize,
        mode: CollaborativeMode,
    ) -> Vec<Recommendation> {
        let context = build_user_context(&*self.store, user_id);
        if !context.has_history() {
            debug!("User {} has no ratings; falling back to popularity", user_id);
            return self.popularity.get_recommendations(limit);
        }

        match mode {
            CollaborativeMode::User => self.user_based(&context, limit),
            CollaborativeMode::Item => self.item_based(&context, limit),
        }
    }

    fn user_based(&self, context: &UserContext, limit: usize) -> Vec<Recommendation> {
        let neighbours = self.find_neighbours(context.user_id);
        debug!("Found {} neighbours", neighbours.len());

        if neighbours.is_empty() {
            debug!(
                "No user shares {} rated movies with user {}; falling back to popularity",
                self.min_common_movies, context.user_id
            );
            return self.popularity.get_recommendations(limit);
        }

        let candidates: Vec<Recommendation> = neighbours
            .par_iter()
            .flat_map_iter(|neighbour| self.neighbour_candidates(neighbour, context))
            .collect();
        debug!("Neighbours contributed {} candidates", candidates.len());

        rank(dedup_keep_max(candidates), limit)
    }

    /// Users similar to the target, best first (ties by user id)
    pub fn find_neighbours(&self, user_id: UserId) -> Vec<Neighbour> {
        let mut neighbours: Vec<Neighbour> = self
            .store
            .common_ratings(user_id, self.min_common_movies)
            .par_iter()
            .map(|co_rated| Neighbour {
                user_id: co_rated.user_id,
                similarity: co_rated_cosine(co_rated),
            })
            .collect();

        neighbours.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        neighbours.truncate(self.neighbor_limit);
        neighbours
    }

    /// Liked movies of one neighbour the target has not rated, best first
    fn neighbour_candidates(
        &self,
        neighbour: &Neighbour,
        context: &UserContext,
    ) -> Vec<Recommendation> {
        let mut liked: Vec<(MovieId, u8)> = self
            .store
            .ratings_for_user(neighbour.user_id)
            .into_iter()
            .filter(|(movie_id, rating)| {
                *rating >= self.liked_threshold
                    && !context.has_rated(*movie_id)
                    && self.store.contains_movie(*movie_id)
            })
            .collect();

        liked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        liked.truncate(self.per_neighbor_limit);

        liked
            .into_iter()
            .map(|(movie_id, rating)| {
                Recommendation::new(
                    movie_id,
                    RecommendationMethod::CollaborativeUser,
                    f64::from(rating) * neighbour.similarity,
                )
            })
            .collect()
    }

    /// An empty list here means none of the user's movies are covered by the
    /// similarity artifact; that is not a popularity fallback.
    fn item_based(&self, context: &UserContext, limit: usize) -> Vec<Recommendation> {
        let candidates: Vec<Recommendation> = context
            .ratings
            .par_iter()
            .flat_map_iter(|&(seed, rating)| {
                self.similar
                    .similar_ids(seed, self.similar_per_seed)
                    .into_iter()
                    .filter(move |(movie_id, _)| !context.has_rated(*movie_id))
                    .map(move |(movie_id, similarity)| {
                        Recommendation::new(
                            movie_id,
                            RecommendationMethod::CollaborativeItem,
                            f64::from(similarity) * f64::from(rating) / 10.0,
                        )
                    })
            })
            .collect();
        debug!(
            "{} seed movies produced {} candidates",
            context.ratings.len(),
            candidates.len()
        );

        rank(dedup_keep_max(candidates), limit)
    }
}

/// Cosine similarity over co-rated movies: Σab / (√Σa² · √Σb²)
pub fn co_rated_cosine(co_rated: &CoRatedUser) -> f64 {
    let (mut dot, mut norm_theirs, mut norm_target) = (0.0, 0.0, 0.0);
    for &(theirs, target) in &co_rated.pairs {
        let (a, b) = (f64::from(theirs), f64::from(target));
        dot += a * b;
        norm_theirs += a * a;
        norm_target += b * b;
    }

    let denominator = norm_theirs.sqrt() * norm_target.sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{DataIndex, Movie, Rating, SimilarityMatrix};
    use std::collections::HashSet;

    fn rate(index: &mut DataIndex, user_id: UserId, movie_id: MovieId, rating: u8) {
        index.insert_rating(Rating {
            user_id,
            movie_id,
            rating,
            watched_at: 1_000_000,
            notes: None,
        });
    }

    fn create_test_index() -> DataIndex {
        let mut index = DataIndex::new();

        for id in 1..=10 {
            index.insert_movie(Movie {
                id,
                title: format!("Movie {}", id),
                year: Some(2000),
                release_date: None,
                poster_path: None,
                vote_average: 6.0,
                popularity: id as f32,
                genres: vec!["Drama".to_string()],
            });
        }

        // User 1 - our target (rates 1, 2, 3)
        rate(&mut index, 1, 1, 9);
        rate(&mut index, 1, 2, 8);
        rate(&mut index, 1, 3, 7);

        // User 2 - neighbour, shares 1, 2, 3 and liked 4 and 5
        for (movie_id, rating) in [(1, 9), (2, 8), (3, 7), (4, 10), (5, 7), (6, 3)] {
            rate(&mut index, 2, movie_id, rating);
        }

        // User 3 - neighbour with different taste, also liked 4
        for (movie_id, rating) in [(1, 2), (2, 3), (3, 10), (4, 8), (7, 9)] {
            rate(&mut index, 3, movie_id, rating);
        }

        // User 4 - shares only movie 1
        rate(&mut index, 4, 1, 9);
        rate(&mut index, 4, 8, 10);

        // User 2 also rated a movie missing from the catalog
        rate(&mut index, 2, 999, 10);

        index.build_secondary_indices();
        index
    }

    fn ids(recs: &[Recommendation]) -> Vec<MovieId> {
        recs.iter().map(|r| r.movie_id).collect()
    }

    #[test]
    fn test_find_neighbours() {
        let collaborative = CollaborativeSource::new(Arc::new(create_test_index()));
        let neighbours = collaborative.find_neighbours(1);

        // User 4 shares one movie, below the threshold of 3
        let neighbour_ids: Vec<UserId> = neighbours.iter().map(|n| n.user_id).collect();
        assert_eq!(neighbour_ids, vec![2, 3]);
        // Identical co-ratings give cosine 1
        assert!((neighbours[0].similarity - 1.0).abs() < 1e-12);
        assert!(neighbours[1].similarity < neighbours[0].similarity);
    }

    #[test]
    fn test_co_rated_cosine() {
        let co_rated = CoRatedUser {
            user_id: 9,
            pairs: vec![(2, 9), (3, 8), (10, 7)],
        };
        // (18 + 24 + 70) / (sqrt(113) * sqrt(194))
        let expected = 112.0 / (113f64.sqrt() * 194f64.sqrt());
        assert!((co_rated_cosine(&co_rated) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_user_based_candidates() {
        let collaborative = CollaborativeSource::new(Arc::new(create_test_index()));
        let recs = collaborative.get_recommendations(1, 10, CollaborativeMode::User);

        // 4, 5 from user 2 and 4, 7 from user 3. 6 was disliked, 999 is dangling
        let mut found = ids(&recs);
        found.sort_unstable();
        assert_eq!(found, vec![4, 5, 7]);

        // Movie 4 keeps user 2's score: 10 * 1.0 beats 8 * sim(3)
        let movie_4 = recs.iter().find(|r| r.movie_id == 4).unwrap();
        assert!((movie_4.score - 10.0).abs() < 1e-9);
        assert_eq!(recs[0].movie_id, 4);
        assert!(recs.iter().all(|r| r.method == RecommendationMethod::CollaborativeUser));
    }

    #[test]
    fn test_user_based_has_no_duplicates() {
        let collaborative = CollaborativeSource::new(Arc::new(create_test_index()));
        let recs = collaborative.get_recommendations(1, 10, CollaborativeMode::User);
        let unique: HashSet<MovieId> = recs.iter().map(|r| r.movie_id).collect();
        assert_eq!(unique.len(), recs.len());
    }

    #[test]
    fn test_per_neighbour_cap() {
        let collaborative = CollaborativeSource::new(Arc::new(create_test_index()))
            .with_per_neighbor_limit(1)
            .with_neighbor_limit(1);
        let recs = collaborative.get_recommendations(1, 10, CollaborativeMode::User);

        // Only user 2, only their top movie
        assert_eq!(ids(&recs), vec![4]);
    }

    #[test]
    fn test_no_neighbours_falls_back_to_popularity() {
        let collaborative = CollaborativeSource::new(Arc::new(create_test_index()))
            .with_min_common_movies(4);
        let recs = collaborative.get_recommendations(1, 3, CollaborativeMode::User);

        assert_eq!(ids(&recs), vec![10, 9, 8]);
        assert!(recs.iter().all(|r| r.method == RecommendationMethod::Popularity));
    }

    #[test]
    fn test_no_history_falls_back_to_popularity() {
        let collaborative = CollaborativeSource::new(Arc::new(create_test_index()));
        for mode in [CollaborativeMode::User, CollaborativeMode::Item] {
            let recs = collaborative.get_recommendations(42, 2, mode);
            assert_eq!(ids(&recs), vec![10, 9]);
        }
    }

    #[test]
    fn test_item_based() {
        let mut index = create_test_index();
        index.set_similarity(
            SimilarityMatrix::from_parts(
                vec![1, 2, 4, 5],
                vec![
                    vec![1.0, 0.9, 0.8, 0.1],
                    vec![0.9, 1.0, 0.2, 0.6],
                    vec![0.8, 0.2, 1.0, 0.3],
                    vec![0.1, 0.6, 0.3, 1.0],
                ],
            )
            .unwrap(),
        );
        let collaborative = CollaborativeSource::new(Arc::new(index));
        let recs = collaborative.get_recommendations(1, 10, CollaborativeMode::Item);

        // From seed 1 (rated 9): 4 = 0.8 * 0.9, 5 = 0.1 * 0.9
        // From seed 2 (rated 8): 4 = 0.2 * 0.8, 5 = 0.6 * 0.8
        assert_eq!(ids(&recs), vec![4, 5]);
        assert!((recs[0].score - 0.72).abs() < 1e-6);
        assert!((recs[1].score - 0.48).abs() < 1e-6);
        assert!(recs.iter().all(|r| r.method == RecommendationMethod::CollaborativeItem));
    }

    #[test]
    fn test_item_based_without_coverage_is_empty() {
        let collaborative = CollaborativeSource::new(Arc::new(create_test_index()));
        let recs = collaborative.get_recommendations(1, 10, CollaborativeMode::Item);
        assert!(recs.is_empty());
    }
}
