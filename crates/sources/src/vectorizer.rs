//! Genre Vectorizer
//!
//! Maps a movie's genre set onto a fixed-length binary vector. Axis `i` is
//! the `i`-th genre of the vocabulary sorted by name, so every vector built
//! from one snapshot has the same length and axis order.
//!
//! The vectorizer is built from one batched `genre_assignments` call and
//! then answers per-movie lookups from memory.

use data_loader::{GenreAccessor, MovieId};
use std::collections::HashMap;

/// The sorted genre vocabulary defining feature axis order
#[derive(Debug, Clone, PartialEq)]
pub struct GenreVocabulary {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl GenreVocabulary {
    /// Build from genre names; sorts and deduplicates them
    pub fn new(mut names: Vec<String>) -> Self {
        names.sort();
        names.dedup();
        let positions = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, positions }
    }

    pub fn from_store<S: GenreAccessor + ?Sized>(store: &S) -> Self {
        Self::new(store.all_genre_names_sorted())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, genre: &str) -> Option<usize> {
        self.positions.get(genre).copied()
    }

    /// Binary vector for a genre set. Names outside the vocabulary are ignored.
    pub fn encode(&self, genres: &[String]) -> Vec<f64> {
        let mut vector = vec![0.0; self.len()];
        for genre in genres {
            if let Some(i) = self.position(genre) {
                vector[i] = 1.0;
            }
        }
        vector
    }
}

/// Genre vectors for every movie of a snapshot
#[derive(Debug, Clone)]
pub struct GenreVectorizer {
    vocabulary: GenreVocabulary,
    vectors: HashMap<MovieId, Vec<f64>>,
    /// Movie ids in ascending order
    movie_ids: Vec<MovieId>,
}

impl GenreVectorizer {
    /// Fetch the vocabulary and all genre assignments once, vectorize them all
    pub fn build<S: GenreAccessor + ?Sized>(store: &S) -> Self {
        let vocabulary = GenreVocabulary::from_store(store);
        let assignments = store.genre_assignments();

        let mut movie_ids = Vec::with_capacity(assignments.len());
        let mut vectors = HashMap::with_capacity(assignments.len());
        for (movie_id, genres) in assignments {
            movie_ids.push(movie_id);
            vectors.insert(movie_id, vocabulary.encode(genres));
        }
        movie_ids.sort_unstable();

        Self {
            vocabulary,
            vectors,
            movie_ids,
        }
    }

    pub fn vocabulary(&self) -> &GenreVocabulary {
        &self.vocabulary
    }

    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    /// Movie ids known to the vectorizer, ascending
    pub fn movie_ids(&self) -> &[MovieId] {
        &self.movie_ids
    }

    /// `None` if the movie is not in the catalog
    pub fn get(&self, movie_id: MovieId) -> Option<&[f64]> {
        self.vectors.get(&movie_id).map(Vec::as_slice)
    }

    /// Vector for a movie, or all zeros if the movie is unknown
    pub fn vector_for(&self, movie_id: MovieId) -> Vec<f64> {
        self.get(movie_id)
            .map(<[f64]>::to_vec)
            .unwrap_or_else(|| vec![0.0; self.dimension()])
    }
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}
