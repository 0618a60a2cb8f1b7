//! # Data Loader Crate
//!
//! This crate loads and indexes the catalog snapshot the recommendation
//! engine reads: movies, the genre vocabulary, rating history and the
//! precomputed similarity artifact.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Genre, Rating, DataIndex)
//! - **parser**: Parse .dat files and the similarity JSON into Rust structs
//! - **index**: Build and validate the in-memory indices
//! - **similarity**: The similarity matrix and its id <-> index mapping
//! - **accessors**: Read-only traits the engine consumes
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{DataIndex, RatingsAccessor};
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_files(Path::new("data/catalog"))?;
//! let history = index.ratings_for_user(1);
//! println!("User 1 rated {} movies", history.len());
//! ```

// Public modules
pub mod accessors;
pub mod error;
pub mod index;
pub mod parser;
pub mod similarity;
pub mod types;

// Re-export commonly used types for convenience
pub use accessors::{
    CatalogStore, CoRatedUser, GenreAccessor, MovieAccessor, RatingsAccessor, SimilarityAccessor,
};
pub use error::{DataLoadError, Result};
pub use similarity::SimilarityMatrix;
pub use types::{
    // Type aliases
    GenreId,
    MovieId,
    UserId,
    // Core types
    DataIndex,
    Genre,
    Movie,
    MovieBrief,
    Rating,
    // Constants
    MAX_RATING,
    MIN_RATING,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_index_creation() {
        let index = DataIndex::new();
        let (movies, genres, ratings) = index.counts();

        assert_eq!(movies, 0);
        assert_eq!(genres, 0);
        assert_eq!(ratings, 0);
        assert!(index.similarity().is_empty());
    }

    #[test]
    fn test_insert_movie() {
        let mut index = DataIndex::new();

        let movie = Movie {
            id: 862,
            title: "Toy Story".to_string(),
            year: Some(1995),
            release_date: Some("1995-10-30".to_string()),
            poster_path: Some("/toy.jpg".to_string()),
            vote_average: 7.9,
            popularity: 50.0,
            genres: vec!["Animation".to_string(), "Comedy".to_string()],
        };

        index.insert_movie(movie.clone());

        let retrieved = index.get_movie(862).unwrap();
        assert_eq!(retrieved, &movie);
        assert_eq!(retrieved.brief().title, "Toy Story");
    }

    #[test]
    fn test_insert_rating() {
        let mut index = DataIndex::new();

        index.insert_rating(Rating {
            user_id: 1,
            movie_id: 862,
            rating: 8,
            watched_at: 978300760,
            notes: None,
        });

        let user_ratings = index.get_user_ratings(1);
        assert_eq!(user_ratings.len(), 1);
        assert_eq!(user_ratings[0].rating, 8);
        assert_eq!(index.get_movie_ratings(862).len(), 1);
        assert_eq!(index.get_all_user_ids(), vec![1]);
    }

    #[test]
    fn test_insert_genre_replaces_same_name() {
        let mut index = DataIndex::new();
        index.insert_genre(Genre { id: 1, name: "Drama".to_string() });
        index.insert_genre(Genre { id: 7, name: "Drama".to_string() });

        assert_eq!(index.genres().len(), 1);
        assert_eq!(index.genres()[0].id, 7);
    }

    #[test]
    fn test_empty_queries() {
        let index = DataIndex::new();

        assert!(index.get_movie(999).is_none());
        assert!(index.get_user_ratings(999).is_empty());
        assert!(index.get_movie_ratings(999).is_empty());
        assert!(index.get_movies_by_genre("Action").is_empty());
        assert!(index.ratings_for_user(999).is_empty());
        assert!(index.movie_id_to_index(999).is_none());
    }
}
