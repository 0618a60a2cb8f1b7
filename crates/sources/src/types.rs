//! Shared types for recommendation sources.

use data_loader::MovieId;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which algorithm produced a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationMethod {
    Content,
    CollaborativeUser,
    CollaborativeItem,
    Hybrid,
    Popularity,
    Profile,
    Similarity,
}

impl fmt::Display for RecommendationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Content => "content",
            Self::CollaborativeUser => "collaborative_user",
            Self::CollaborativeItem => "collaborative_item",
            Self::Hybrid => "hybrid",
            Self::Popularity => "popularity",
            Self::Profile => "profile",
            Self::Similarity => "similarity",
        };
        f.write_str(name)
    }
}

/// A scored movie. Transient: built per request and discarded after.
///
/// What `score` means depends on `method`: a dot product for content, a
/// weighted rating for collaborative filtering, a blended value for hybrid.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub score: f64,
    pub method: RecommendationMethod,
}

impl Recommendation {
    pub fn new(movie_id: MovieId, method: RecommendationMethod, score: f64) -> Self {
        Self {
            movie_id,
            score,
            method,
        }
    }
}

/// Collaborative filtering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollaborativeMode {
    /// Nearest-neighbour users over co-rated movies
    User,
    /// Precomputed movie-movie similarity
    Item,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid collaborative mode {0:?}; use \"user\" or \"item\"")]
pub struct ParseModeError(pub String);

impl FromStr for CollaborativeMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "item" => Ok(Self::Item),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

impl fmt::Display for CollaborativeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Item => f.write_str("item"),
        }
    }
}

/// Descending by score, then ascending by movie id
///
/// NaN scores compare equal to everything rather than panicking.
pub fn by_score_desc(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.movie_id.cmp(&b.movie_id))
}

/// Sort descending and keep the top `limit`
pub fn rank(mut recommendations: Vec<Recommendation>, limit: usize) -> Vec<Recommendation> {
    recommendations.sort_by(by_score_desc);
    recommendations.truncate(limit);
    recommendations
}

/// Collapse duplicate movie ids, keeping the highest score seen
pub fn dedup_keep_max(
    recommendations: impl IntoIterator<Item = Recommendation>,
) -> Vec<Recommendation> {
    let mut best: HashMap<MovieId, Recommendation> = HashMap::new();
    for rec in recommendations {
        best.entry(rec.movie_id)
            .and_modify(|existing| {
                if rec.score > existing.score {
                    *existing = rec.clone();
                }
            })
            .or_insert(rec);
    }
    best.into_values().collect()
}
