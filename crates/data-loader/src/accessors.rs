//! Read-only accessor traits the recommendation engine consumes.
//!
//! The engine never touches `DataIndex` fields directly. It reads the store
//! through these four traits, which keeps the scoring math independent of
//! how the snapshot is held. `DataIndex` implements all of them.

use crate::types::{DataIndex, MovieBrief, MovieId, UserId};
use std::collections::HashMap;

/// Another user's overlap with a target user
#[derive(Debug, Clone, PartialEq)]
pub struct CoRatedUser {
    pub user_id: UserId,
    /// (their rating, target's rating) for every co-rated movie
    pub pairs: Vec<(u8, u8)>,
}

/// Rating history queries
pub trait RatingsAccessor {
    /// Every (movie, rating) the user has recorded, in write order
    fn ratings_for_user(&self, user_id: UserId) -> Vec<(MovieId, u8)>;

    /// Users sharing at least `min_common` rated movies with `user_id`,
    /// ascending by user id. Movies missing from the catalog are not counted.
    fn common_ratings(&self, user_id: UserId, min_common: usize) -> Vec<CoRatedUser>;
}

/// Genre vocabulary and assignments
pub trait GenreAccessor {
    /// The whole vocabulary, sorted by name
    fn all_genre_names_sorted(&self) -> Vec<String>;

    /// Genre names of one movie; `None` if the movie is unknown
    fn genres_for_movie(&self, movie_id: MovieId) -> Option<&[String]>;

    /// Genre names of every movie in one batch
    fn genre_assignments(&self) -> Vec<(MovieId, &[String])>;
}

/// Movie metadata
pub trait MovieAccessor {
    fn contains_movie(&self, movie_id: MovieId) -> bool;

    fn movie_brief(&self, movie_id: MovieId) -> Option<MovieBrief>;

    /// Every movie, ascending by id
    fn all_movies_brief(&self) -> Vec<MovieBrief>;
}

/// The precomputed similarity artifact
pub trait SimilarityAccessor {
    fn similarity_row(&self, matrix_index: usize) -> Option<&[f32]>;

    fn movie_id_to_index(&self, movie_id: MovieId) -> Option<usize>;

    fn index_to_movie_id(&self, matrix_index: usize) -> Option<MovieId>;
}

/// Everything the engine reads, shareable across threads
pub trait CatalogStore:
    RatingsAccessor + GenreAccessor + MovieAccessor + SimilarityAccessor + Send + Sync
{
}

impl<T> CatalogStore for T where
    T: RatingsAccessor + GenreAccessor + MovieAccessor + SimilarityAccessor + Send + Sync
{
}

impl RatingsAccessor for DataIndex {
    fn ratings_for_user(&self, user_id: UserId) -> Vec<(MovieId, u8)> {
        self.get_user_ratings(user_id)
            .iter()
            .map(|r| (r.movie_id, r.rating))
            .collect()
    }

    fn common_ratings(&self, user_id: UserId, min_common: usize) -> Vec<CoRatedUser> {
        let mut overlap: HashMap<UserId, Vec<(u8, u8)>> = HashMap::new();

        let in_catalog = self
            .get_user_ratings(user_id)
            .iter()
            .filter(|r| self.movies.contains_key(&r.movie_id));
        for target in in_catalog {
            for other in self.get_movie_ratings(target.movie_id) {
                if other.user_id != user_id {
                    overlap
                        .entry(other.user_id)
                        .or_default()
                        .push((other.rating, target.rating));
                }
            }
        }

        let mut users: Vec<CoRatedUser> = overlap
            .into_iter()
            .filter(|(_, pairs)| pairs.len() >= min_common)
            .map(|(user_id, pairs)| CoRatedUser { user_id, pairs })
            .collect();
        users.sort_unstable_by_key(|u| u.user_id);
        users
    }
}

impl GenreAccessor for DataIndex {
    fn all_genre_names_sorted(&self) -> Vec<String> {
        let mut names: Vec<String> = self.genres.iter().map(|g| g.name.clone()).collect();
        names.sort();
        names
    }

    fn genres_for_movie(&self, movie_id: MovieId) -> Option<&[String]> {
        self.get_movie(movie_id).map(|m| m.genres.as_slice())
    }

    fn genre_assignments(&self) -> Vec<(MovieId, &[String])> {
        self.movie_order
            .iter()
            .filter_map(|id| self.movies.get(id).map(|m| (*id, m.genres.as_slice())))
            .collect()
    }
}

impl MovieAccessor for DataIndex {
    fn contains_movie(&self, movie_id: MovieId) -> bool {
        self.movies.contains_key(&movie_id)
    }

    fn movie_brief(&self, movie_id: MovieId) -> Option<MovieBrief> {
        self.get_movie(movie_id).map(|m| m.brief())
    }

    fn all_movies_brief(&self) -> Vec<MovieBrief> {
        self.movie_order
            .iter()
            .filter_map(|id| self.movies.get(id).map(|m| m.brief()))
            .collect()
    }
}

impl SimilarityAccessor for DataIndex {
    fn similarity_row(&self, matrix_index: usize) -> Option<&[f32]> {
        self.similarity.row(matrix_index)
    }

    fn movie_id_to_index(&self, movie_id: MovieId) -> Option<usize> {
        self.similarity.index_of(movie_id)
    }

    fn index_to_movie_id(&self, matrix_index: usize) -> Option<MovieId> {
        self.similarity.movie_at(matrix_index)
    }
}
