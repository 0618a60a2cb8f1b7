//! # Sources Crate
//!
//! This crate implements the scoring strategies of the recommendation engine.
//! Every source reads the catalog through `Arc<dyn CatalogStore>` and
//! returns a ranked `Vec<Recommendation>`.
//!
//! ## Components
//!
//! ### Content Source
//! Genre-space affinity: "More movies in the genres you rate highly"
//! - Builds a profile from the user's ratings (weight `(r - 5.5) / 10`)
//! - Scores every unrated movie by dot product with its genre vector
//!
//! ### Collaborative Source
//! - User mode: "Users who rate like you also liked..."
//! - Item mode: "Movies similar to the ones you rated" via the precomputed
//!   similarity artifact
//!
//! ### Fallbacks and lookups
//! - Popularity: global ranking, used whenever a source has no signal
//! - Similar: nearest movies to a seed movie
//! - Profile: taste presets for visitors without history
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{CollaborativeMode, CollaborativeSource, ContentSource};
//! use data_loader::{CatalogStore, DataIndex};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn CatalogStore> =
//!     Arc::new(DataIndex::load_from_files(Path::new("data/catalog"))?);
//!
//! let content = ContentSource::new(Arc::clone(&store));
//! let collaborative = CollaborativeSource::new(Arc::clone(&store)).with_neighbor_limit(25);
//!
//! let by_genre = content.get_recommendations(user_id, 20);
//! let by_neighbours = collaborative.get_recommendations(user_id, 20, CollaborativeMode::User);
//! ```

// Public modules
pub mod collaborative;
pub mod content;
pub mod popularity;
pub mod presets;
pub mod similar;
pub mod types;
pub mod user_context;
pub mod vectorizer;

// Re-export commonly used types
pub use collaborative::{CollaborativeSource, Neighbour};
pub use content::{ContentSource, UserProfile};
pub use popularity::PopularitySource;
pub use presets::{ProfileSource, TastePresets};
pub use similar::SimilarSource;
pub use types::{CollaborativeMode, ParseModeError, Recommendation, RecommendationMethod};
pub use user_context::{build_user_context, UserContext};
pub use vectorizer::{GenreVectorizer, GenreVocabulary};

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{CatalogStore, DataIndex, Genre, Movie, Rating};
    use std::sync::Arc;

    fn create_test_index() -> DataIndex {
        let mut index = DataIndex::new();

        index.insert_genre(Genre { id: 1, name: "Action".to_string() });

        index.insert_movie(Movie {
            id: 1,
            title: "Test Movie (2000)".to_string(),
            year: Some(2000),
            release_date: None,
            poster_path: None,
            vote_average: 7.0,
            popularity: 20.0,
            genres: vec!["Action".to_string()],
        });

        index.insert_rating(Rating {
            user_id: 1,
            movie_id: 1,
            rating: 8,
            watched_at: 1000000,
            notes: None,
        });

        index.build_secondary_indices();
        index
    }

    #[test]
    fn test_sources_share_one_store() {
        let store: Arc<dyn CatalogStore> = Arc::new(create_test_index());

        let content = ContentSource::new(Arc::clone(&store));
        let collaborative = CollaborativeSource::new(Arc::clone(&store));
        let popularity = PopularitySource::new(Arc::clone(&store));

        // The only movie is already rated
        assert!(content.get_recommendations(1, 10).is_empty());
        // No neighbours, so popularity answers
        assert_eq!(
            collaborative.get_recommendations(1, 10, CollaborativeMode::User),
            popularity.get_recommendations(10)
        );
    }

    #[test]
    fn test_recommendation_creation() {
        let rec = Recommendation::new(1, RecommendationMethod::Content, 0.85);
        assert_eq!(rec.movie_id, 1);
        assert_eq!(rec.method, RecommendationMethod::Content);
        assert_eq!(rec.score, 0.85);
        assert_eq!(rec.method.to_string(), "content");
    }
}
