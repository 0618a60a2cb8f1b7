//! Content-Based Scorer
//!
//! Scores every unrated movie by the dot product of the user's genre profile
//! with the movie's genre vector.

use crate::types::{rank, Recommendation, RecommendationMethod};
use crate::user_context::{build_user_context, profile_vector};
use crate::vectorizer::{dot, GenreVectorizer};
use data_loader::{CatalogStore, UserId};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct ContentSource {
    store: Arc<dyn CatalogStore>,
}

/// A user's preference profile alongside the axes it is expressed in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub genres: Vec<String>,
    pub weights: Vec<f64>,
    pub rated_count: usize,
}

impl ContentSource {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Rank unrated movies by genre affinity
    ///
    /// A user without history has the zero profile, so every movie scores 0
    /// and the list comes back in movie id order.
    #[instrument(skip(self))]
    pub fn get_recommendations(&self, user_id: UserId, limit: usize) -> Vec<Recommendation> {
        let context = build_user_context(&*self.store, user_id);
        let vectorizer = GenreVectorizer::build(&*self.store);
        let profile = profile_vector(&context, &vectorizer);

        debug!(
            "Scoring {} movies against a {}-genre profile ({} rated)",
            vectorizer.movie_ids().len(),
            profile.len(),
            context.ratings.len()
        );

        let recommendations: Vec<Recommendation> = vectorizer
            .movie_ids()
            .par_iter()
            .filter(|movie_id| !context.has_rated(**movie_id))
            .filter_map(|&movie_id| {
                let genres = vectorizer.get(movie_id)?;
                Some(Recommendation::new(
                    movie_id,
                    RecommendationMethod::Content,
                    dot(&profile, genres),
                ))
            })
            .collect();

        let ranked = rank(recommendations, limit);
        debug!("Generated {} content recommendations", ranked.len());
        ranked
    }

    /// The user's normalized genre profile
    pub fn user_profile(&self, user_id: UserId) -> UserProfile {
        let context = build_user_context(&*self.store, user_id);
        let vectorizer = GenreVectorizer::build(&*self.store);
        let weights = profile_vector(&context, &vectorizer);

        UserProfile {
            user_id,
            genres: vectorizer.vocabulary().names().to_vec(),
            weights,
            rated_count: context.ratings.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{DataIndex, Genre, Movie, MovieId, Rating};

    fn create_test_index() -> DataIndex {
        let mut index = DataIndex::new();
        for (id, name) in [(1, "Drama"), (2, "Comedy"), (3, "Horror")] {
            index.insert_genre(Genre { id, name: name.to_string() });
        }

        let movies: [(MovieId, &[&str]); 6] = [
            (1, &["Drama"]),
            (2, &["Comedy"]),
            (3, &["Drama"]),
            (4, &["Drama", "Horror"]),
            (5, &["Comedy", "Horror"]),
            (6, &[]),
        ];
        for (id, genres) in movies {
            index.insert_movie(Movie {
                id,
                title: format!("Movie {}", id),
                year: None,
                release_date: None,
                poster_path: None,
                vote_average: 6.0,
                popularity: 5.0,
                genres: genres.iter().map(|g| g.to_string()).collect(),
            });
        }

        // User 1 loves drama and dislikes comedy
        for (movie_id, rating) in [(1, 9), (2, 2)] {
            index.insert_rating(Rating {
                user_id: 1,
                movie_id,
                rating,
                watched_at: 1_000_000,
                notes: None,
            });
        }

        index.build_secondary_indices();
        index
    }

    #[test]
    fn test_content_excludes_rated_movies() {
        let content = ContentSource::new(Arc::new(create_test_index()));
        let recs = content.get_recommendations(1, 10);

        let ids: Vec<MovieId> = recs.iter().map(|r| r.movie_id).collect();
        assert!(!ids.contains(&1));
        assert!(!ids.contains(&2));
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_content_prefers_profile_genres() {
        let content = ContentSource::new(Arc::new(create_test_index()));
        let recs = content.get_recommendations(1, 10);

        // Drama-only 3 and Drama|Horror 4 tie at ~0.707; genreless 6 is 0;
        // Comedy|Horror 5 is negative
        let ids: Vec<MovieId> = recs.iter().map(|r| r.movie_id).collect();
        assert_eq!(ids, vec![3, 4, 6, 5]);
        assert!((recs[0].score - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
        assert_eq!(recs[2].score, 0.0);
        assert!(recs[3].score < 0.0);
    }

    #[test]
    fn test_content_without_history_scores_zero() {
        let content = ContentSource::new(Arc::new(create_test_index()));
        let recs = content.get_recommendations(77, 3);

        let ids: Vec<MovieId> = recs.iter().map(|r| r.movie_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(recs.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn test_user_profile() {
        let content = ContentSource::new(Arc::new(create_test_index()));
        let profile = content.user_profile(1);

        assert_eq!(profile.genres, vec!["Comedy", "Drama", "Horror"]);
        assert_eq!(profile.weights.len(), 3);
        assert_eq!(profile.rated_count, 2);
        assert_eq!(profile.weights[2], 0.0);
    }
}
