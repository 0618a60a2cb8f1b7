//! User context and the genre-space preference profile
//!
//! A `UserContext` gathers a user's rating history once so the scorers do
//! not query the store repeatedly. `profile_vector` turns that history into
//! one L2-normalized vector over the genre vocabulary.

use crate::vectorizer::{l2_norm, GenreVectorizer};
use data_loader::{MovieId, RatingsAccessor, UserId};
use std::collections::HashSet;

/// Rating history of one user, gathered upfront
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserContext {
    pub user_id: UserId,
    /// (movie, rating) in write order
    pub ratings: Vec<(MovieId, u8)>,
    /// Every movie the user has rated, for O(1) exclusion checks
    pub rated_movies: HashSet<MovieId>,
}

impl UserContext {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    pub fn has_history(&self) -> bool {
        !self.ratings.is_empty()
    }

    pub fn has_rated(&self, movie_id: MovieId) -> bool {
        self.rated_movies.contains(&movie_id)
    }
}

/// Build a UserContext for a user. Unknown users get an empty history.
pub fn build_user_context<S: RatingsAccessor + ?Sized>(store: &S, user_id: UserId) -> UserContext {
    let ratings = store.ratings_for_user(user_id);
    let rated_movies = ratings.iter().map(|(movie_id, _)| *movie_id).collect();
    UserContext {
        user_id,
        ratings,
        rated_movies,
    }
}

/// Preference weight of one rating: 10 maps to +0.45, 1 maps to -0.45
pub fn rating_weight(rating: u8) -> f64 {
    (f64::from(rating) - 5.5) / 10.0
}

/// Weighted sum of the rated movies' genre vectors, L2-normalized
///
/// Ratings of movies the vectorizer does not know are skipped. A zero norm
/// (no history, or exact cancellation) returns the zero vector as is.
pub fn profile_vector(context: &UserContext, vectorizer: &GenreVectorizer) -> Vec<f64> {
    let mut profile = vec![0.0; vectorizer.dimension()];

    for &(movie_id, rating) in &context.ratings {
        let Some(genres) = vectorizer.get(movie_id) else {
            continue;
        };
        let weight = rating_weight(rating);
        for (acc, value) in profile.iter_mut().zip(genres) {
            *acc += value * weight;
        }
    }

    let norm = l2_norm(&profile);
    if norm > 0.0 {
        for value in &mut profile {
            *value /= norm;
        }
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{DataIndex, Genre, Movie, Rating};

    fn insert_movie(index: &mut DataIndex, id: MovieId, genres: &[&str]) {
        index.insert_movie(Movie {
            id,
            title: format!("Movie {}", id),
            year: Some(2001),
            release_date: None,
            poster_path: None,
            vote_average: 6.5,
            popularity: 10.0,
            genres: genres.iter().map(|g| g.to_string()).collect(),
        });
    }

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
        index.insert_genre(Genre { id: 1, name: "Drama".to_string() });
        index.insert_genre(Genre { id: 2, name: "Comedy".to_string() });

        insert_movie(&mut index, 1, &["Drama"]);
        insert_movie(&mut index, 2, &["Comedy"]);
        insert_movie(&mut index, 3, &["Drama", "Comedy"]);

        rate(&mut index, 1, 1, 9);
        rate(&mut index, 1, 2, 2);

        index.build_secondary_indices();
        index
    }

    #[test]
    fn test_build_user_context() {
        let index = create_test_index();
        let context = build_user_context(&index, 1);

        assert_eq!(context.user_id, 1);
        assert_eq!(context.ratings, vec![(1, 9), (2, 2)]);
        assert!(context.has_rated(1));
        assert!(!context.has_rated(3));
    }

    #[test]
    fn test_unknown_user_has_empty_context() {
        let index = create_test_index();
        let context = build_user_context(&index, 42);
        assert!(!context.has_history());
        assert!(context.rated_movies.is_empty());
    }

    #[test]
    fn test_profile_liked_drama_disliked_comedy() {
        let index = create_test_index();
        let vectorizer = GenreVectorizer::build(&index);
        let profile = profile_vector(&build_user_context(&index, 1), &vectorizer);

        // Axes: Comedy, Drama. Raw [-0.35, 0.35] normalizes to ~[-0.707, 0.707]
        let half_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
        assert!((profile[0] + half_sqrt2).abs() < 1e-9);
        assert!((profile[1] - half_sqrt2).abs() < 1e-9);
        assert!((l2_norm(&profile) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_profile_without_history_is_zero() {
        let index = create_test_index();
        let vectorizer = GenreVectorizer::build(&index);
        let profile = profile_vector(&build_user_context(&index, 42), &vectorizer);
        assert_eq!(profile, vec![0.0, 0.0]);
    }

    #[test]
    fn test_profile_cancellation_stays_zero() {
        let mut index = create_test_index();
        // 10 and 1 weigh +0.45 and -0.45 on the same single genre
        insert_movie(&mut index, 4, &["Drama"]);
        rate(&mut index, 2, 1, 10);
        rate(&mut index, 2, 4, 1);
        index.build_secondary_indices();

        let vectorizer = GenreVectorizer::build(&index);
        let profile = profile_vector(&build_user_context(&index, 2), &vectorizer);
        assert_eq!(profile, vec![0.0, 0.0]);
    }

    #[test]
    fn test_profile_skips_dangling_ratings() {
        let mut index = create_test_index();
        rate(&mut index, 3, 1, 8);
        rate(&mut index, 3, 999, 1);
        index.build_secondary_indices();

        let vectorizer = GenreVectorizer::build(&index);
        let profile = profile_vector(&build_user_context(&index, 3), &vectorizer);
        assert_eq!(profile.len(), 2);
        assert_eq!(profile, vec![0.0, 1.0]);
    }
}
