//! Core domain types for the movie catalog snapshot.
//!
//! This module defines the fundamental data structures used throughout the system.
//! Key Rust concepts demonstrated here:
//! - Type aliases for domain clarity (UserId, MovieId, GenreId)
//! - Structs with public fields
//! - HashMap indices for O(1) lookups
//! - Borrowing: the index owns the data and hands out references

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::similarity::SimilarityMatrix;

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user IDs with movie IDs

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

/// Unique identifier for a genre
pub type GenreId = u32;

/// Lowest rating a user can give
pub const MIN_RATING: u8 = 1;

/// Highest rating a user can give
pub const MAX_RATING: u8 = 10;

// =============================================================================
// Movie-related Types
// =============================================================================

/// Represents a movie in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Release year, taken from the release date or a "(1995)" title suffix
    pub year: Option<u16>,
    /// Release date as stored upstream (usually "YYYY-MM-DD")
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    /// Average vote on a 0-10 scale
    pub vote_average: f32,
    /// Upstream popularity metric (unbounded, larger is more popular)
    pub popularity: f32,
    /// Genre names assigned to this movie
    ///
    /// Names rather than ids: the genre vocabulary is keyed by name
    pub genres: Vec<String>,
}

impl Movie {
    /// Project the display fields the recommendation endpoints return
    pub fn brief(&self) -> MovieBrief {
        MovieBrief {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            release_date: self.release_date.clone(),
            vote_average: self.vote_average,
            popularity: self.popularity,
        }
    }
}

/// Display projection of a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieBrief {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f32,
    pub popularity: f32,
}

/// A genre in the catalog vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    /// Unique name; the sorted names define feature-vector axis order
    pub name: String,
}

// =============================================================================
// Rating Type
// =============================================================================

/// A single history entry: one user's rating of one movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value from 1 to 10
    pub rating: u8,
    /// Unix timestamp when the movie was watched
    pub watched_at: i64,
    pub notes: Option<String>,
}

// =============================================================================
// DataIndex - The Core In-Memory Snapshot
// =============================================================================

/// Main data structure that holds the catalog snapshot and its indices.
///
/// This is the heart of the data-loader crate. It provides O(1) lookups
/// for movies and ratings through HashMap indices, and it is what the
/// recommendation engine reads through the accessor traits.
///
/// Once built it is never mutated, so it can be shared across threads
/// behind an `Arc` without a lock.
#[derive(Debug)]
pub struct DataIndex {
    // Primary data stores
    pub(crate) movies: HashMap<MovieId, Movie>,
    /// Genre vocabulary, sorted by name once secondary indices are built
    pub(crate) genres: Vec<Genre>,

    // Rating indices for fast lookups
    /// All ratings made by each user, in write order
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
    /// All ratings received by each movie
    pub(crate) movie_ratings: HashMap<MovieId, Vec<Rating>>,

    // Secondary indices
    /// Movie ids in ascending order, so full-catalog scans are deterministic
    pub(crate) movie_order: Vec<MovieId>,
    /// Movies grouped by genre name
    pub(crate) genre_index: HashMap<String, Vec<MovieId>>,

    /// Precomputed movie-movie similarity artifact
    pub(crate) similarity: SimilarityMatrix,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self {
            movies: HashMap::new(),
            genres: Vec::new(),
            user_ratings: HashMap::new(),
            movie_ratings: HashMap::new(),
            movie_order: Vec::new(),
            genre_index: HashMap::new(),
            similarity: SimilarityMatrix::empty(),
        }
    }

    // Getters - These return references (&T) not owned values (T)

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// Get all ratings made by a user
    ///
    /// Returns an empty slice if user has no ratings
    pub fn get_user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all ratings for a movie
    pub fn get_movie_ratings(&self, movie_id: MovieId) -> &[Rating] {
        self.movie_ratings
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all movies tagged with a genre name
    pub fn get_movies_by_genre(&self, genre: &str) -> &[MovieId] {
        self.genre_index
            .get(genre)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All movie ids, ascending
    pub fn get_all_movie_ids(&self) -> &[MovieId] {
        &self.movie_order
    }

    /// The genre vocabulary (sorted by name after indexing)
    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    /// All user ids that have at least one rating, ascending
    pub fn get_all_user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.user_ratings.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// The precomputed similarity artifact
    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    // Mutators - used while loading, before the index is shared

    /// Insert a movie into the index
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    /// Insert a genre into the vocabulary, replacing one with the same name
    pub fn insert_genre(&mut self, genre: Genre) {
        match self.genres.iter_mut().find(|g| g.name == genre.name) {
            Some(existing) => *existing = genre,
            None => self.genres.push(genre),
        }
    }

    /// Insert a rating and update indices
    ///
    /// A (user, movie) pair holds one rating: a later write replaces the
    /// earlier entry in place.
    pub fn insert_rating(&mut self, rating: Rating) {
        upsert(
            self.user_ratings.entry(rating.user_id).or_default(),
            rating.clone(),
            |r| r.movie_id == rating.movie_id,
        );
        let user_id = rating.user_id;
        upsert(
            self.movie_ratings.entry(rating.movie_id).or_default(),
            rating,
            |r| r.user_id == user_id,
        );
    }

    /// Install the similarity artifact
    pub fn set_similarity(&mut self, similarity: SimilarityMatrix) {
        self.similarity = similarity;
    }

    /// Get counts for debugging/validation: (movies, genres, ratings)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_ratings = self.user_ratings.values().map(|v| v.len()).sum();
        (self.movies.len(), self.genres.len(), total_ratings)
    }
}

fn upsert(ratings: &mut Vec<Rating>, rating: Rating, same: impl Fn(&Rating) -> bool) {
    match ratings.iter_mut().find(|r| same(r)) {
        Some(existing) => *existing = rating,
        None => ratings.push(rating),
    }
}

// Implement Default trait for convenience
impl Default for DataIndex {
    fn default() -> Self {
        Self::new()
    }
}
