//! The precomputed movie-movie similarity artifact.
//!
//! The matrix is produced by an offline job and is read-only here. Rows and
//! columns are indexed by matrix index, not by movie id; `movie_ids[i]` is
//! the movie sitting at index `i`.

use crate::error::{DataLoadError, Result};
use crate::types::MovieId;
use serde::Deserialize;
use std::collections::HashMap;

/// On-disk shape of `similarity.json`
#[derive(Debug, Deserialize)]
struct SimilarityArtifact {
    movie_ids: Vec<MovieId>,
    rows: Vec<Vec<f32>>,
}

/// Dense square similarity matrix plus its id <-> index mapping
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    movie_ids: Vec<MovieId>,
    index_of: HashMap<MovieId, usize>,
    rows: Vec<Vec<f32>>,
}

impl SimilarityMatrix {
    /// An artifact covering no movies
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a matrix, checking that it is square and the mapping is unique
    pub fn from_parts(movie_ids: Vec<MovieId>, rows: Vec<Vec<f32>>) -> Result<Self> {
        let side = movie_ids.len();
        if rows.len() != side {
            return Err(DataLoadError::ValidationError(format!(
                "similarity matrix has {} rows for {} movie ids",
                rows.len(),
                side
            )));
        }
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != side) {
            return Err(DataLoadError::ValidationError(format!(
                "similarity row {} has {} columns, expected {}",
                index,
                row.len(),
                side
            )));
        }

        let mut index_of = HashMap::with_capacity(side);
        for (index, &movie_id) in movie_ids.iter().enumerate() {
            if index_of.insert(movie_id, index).is_some() {
                return Err(DataLoadError::ValidationError(format!(
                    "movie {} appears twice in the similarity mapping",
                    movie_id
                )));
            }
        }

        Ok(Self {
            movie_ids,
            index_of,
            rows,
        })
    }

    /// Parse the JSON artifact
    pub fn from_json(content: &str) -> Result<Self> {
        let artifact: SimilarityArtifact = serde_json::from_str(content)?;
        Self::from_parts(artifact.movie_ids, artifact.rows)
    }

    /// Number of movies the artifact covers
    pub fn len(&self) -> usize {
        self.movie_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movie_ids.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn index_of(&self, movie_id: MovieId) -> Option<usize> {
        self.index_of.get(&movie_id).copied()
    }

    pub fn movie_at(&self, index: usize) -> Option<MovieId> {
        self.movie_ids.get(index).copied()
    }
}
