//! DataIndex building and indexing logic.
//!
//! This module builds the DataIndex from parsed data:
//! - Create primary indices (movies, genres, ratings)
//! - Build secondary indices (sorted vocabulary, movie order, genre index)
//! - Validate data integrity

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

impl DataIndex {
    /// Load a catalog snapshot from a directory
    ///
    /// This is the main entry point for loading data.
    ///
    /// Steps:
    /// 1. Parse genres, movies, ratings and the similarity artifact in parallel
    /// 2. Build primary indices
    /// 3. Build secondary indices
    /// 4. Validate data integrity
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading catalog snapshot from {:?}", data_dir);

        let genres_path = data_dir.join("genres.dat");
        let movies_path = data_dir.join("movies.dat");
        let ratings_path = data_dir.join("ratings.dat");
        let similarity_path = data_dir.join("similarity.json");

        // Rayon's `join` runs two closures in parallel; nesting gives
        // four-way parallelism
        let ((genres, movies), (ratings, similarity)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_genres(&genres_path),
                    || parser::parse_movies(&movies_path),
                )
            },
            || {
                rayon::join(
                    || parser::parse_ratings(&ratings_path),
                    || parser::parse_similarity(&similarity_path),
                )
            },
        );

        let genres = genres?;
        let movies = movies?;
        let ratings = ratings?;
        let similarity = similarity?;

        info!(
            "Loaded {} genres, {} movies, {} ratings, similarity artifact covering {} movies",
            genres.len(),
            movies.len(),
            ratings.len(),
            similarity.len()
        );

        let mut index = DataIndex::new();

        for genre in genres {
            index.insert_genre(genre);
        }
        for movie in movies {
            index.insert_movie(movie);
        }
        // File order is write order, so a repeated (user, movie) pair keeps
        // the last line
        for rating in ratings {
            index.insert_rating(rating);
        }
        index.set_similarity(similarity);

        index.build_secondary_indices();
        index.validate()?;

        info!("DataIndex successfully built and validated");
        Ok(index)
    }

    /// Build secondary indices after primary data is loaded
    ///
    /// - Genres referenced by movies but missing from the vocabulary are added
    /// - The vocabulary is sorted by name, fixing the feature axis order
    /// - movie_order and genre_index are rebuilt from scratch
    pub fn build_secondary_indices(&mut self) {
        let known: HashSet<String> = self.genres.iter().map(|g| g.name.clone()).collect();
        let mut next_id = self.genres.iter().map(|g| g.id).max().map_or(1, |id| id + 1);

        let mut movie_order: Vec<MovieId> = self.movies.keys().copied().collect();
        movie_order.sort_unstable();

        let mut undeclared: Vec<String> = Vec::new();
        for movie_id in &movie_order {
            for name in &self.movies[movie_id].genres {
                if !known.contains(name) && !undeclared.contains(name) {
                    undeclared.push(name.clone());
                }
            }
        }
        for name in undeclared {
            warn!("Genre {:?} is used by movies but not declared; adding it", name);
            self.genres.push(Genre { id: next_id, name });
            next_id += 1;
        }

        self.genres.sort_by(|a, b| a.name.cmp(&b.name));

        self.genre_index.clear();
        for movie_id in &movie_order {
            for name in &self.movies[movie_id].genres {
                self.genre_index
                    .entry(name.clone())
                    .or_default()
                    .push(*movie_id);
            }
        }

        self.movie_order = movie_order;
    }

    /// Validate data integrity
    ///
    /// Ratings outside 1-10 are rejected. Ratings that reference a movie
    /// missing from the catalog are kept: the store owns that lifecycle and
    /// the engine skips such entries while scoring. They are counted and
    /// logged here.
    pub fn validate(&self) -> Result<()> {
        let mut dangling = 0usize;

        for ratings in self.user_ratings.values() {
            for rating in ratings {
                if !(MIN_RATING..=MAX_RATING).contains(&rating.rating) {
                    return Err(DataLoadError::InvalidValue {
                        field: "rating".to_string(),
                        value: rating.rating.to_string(),
                    });
                }
                if !self.movies.contains_key(&rating.movie_id) {
                    dangling += 1;
                }
            }
        }

        if dangling > 0 {
            warn!("{} ratings reference movies missing from the catalog", dangling);
        }
        Ok(())
    }
}
