//! Hybrid fusion: blends several ranked lists into one.
//!
//! Each input list is normalized by its own maximum score, multiplied by its
//! weight and accumulated per movie. A movie missing from a list gets 0 from
//! it. Lists weighted 0 are skipped entirely, so they cannot add movies to
//! the union. Excluded movies are removed before ranking.

use crate::weights::HybridWeights;
use data_loader::MovieId;
use sources::types::rank;
use sources::{Recommendation, RecommendationMethod};
use std::collections::{HashMap, HashSet};
use tracing::debug;

struct WeightedList {
    label: &'static str,
    weight: f64,
    recommendations: Vec<Recommendation>,
}

/// Collects weighted input lists (builder pattern) and fuses them.
///
/// ## Usage
/// ```ignore
/// let fused = HybridFusion::new()
///     .add_list("content", 0.4, content_recs)
///     .add_list("collaborative_user", 0.6, user_recs)
///     .excluding(already_rated)
///     .fuse(20);
/// ```
#[derive(Default)]
pub struct HybridFusion {
    inputs: Vec<WeightedList>,
    excluded: HashSet<MovieId>,
}

impl HybridFusion {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard three-way blend
    pub fn from_weights(
        weights: &HybridWeights,
        content: Vec<Recommendation>,
        collaborative_user: Vec<Recommendation>,
        collaborative_item: Vec<Recommendation>,
    ) -> Self {
        Self::new()
            .add_list("content", weights.content, content)
            .add_list("collaborative_user", weights.collaborative_user, collaborative_user)
            .add_list("collaborative_item", weights.collaborative_item, collaborative_item)
    }

    pub fn add_list(
        mut self,
        label: &'static str,
        weight: f64,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        self.inputs.push(WeightedList {
            label,
            weight,
            recommendations,
        });
        self
    }

    /// Movies that must not appear in the fused result
    pub fn excluding(mut self, movie_ids: impl IntoIterator<Item = MovieId>) -> Self {
        self.excluded.extend(movie_ids);
        self
    }

    /// Weighted sum of max-normalized scores, top `limit` of the union
    pub fn fuse(&self, limit: usize) -> Vec<Recommendation> {
        let mut blended: HashMap<MovieId, f64> = HashMap::new();

        for input in &self.inputs {
            if input.weight == 0.0 {
                debug!("Skipping {} at weight 0", input.label);
                continue;
            }
            debug!(
                "Fusing {} {} recommendations at weight {:.3}",
                input.recommendations.len(),
                input.label,
                input.weight
            );
            for (movie_id, normalized) in normalize_by_max(&input.recommendations) {
                if self.excluded.contains(&movie_id) {
                    continue;
                }
                *blended.entry(movie_id).or_insert(0.0) += normalized * input.weight;
            }
        }

        let fused = blended
            .into_iter()
            .map(|(movie_id, score)| Recommendation::new(movie_id, RecommendationMethod::Hybrid, score))
            .collect();
        rank(fused, limit)
    }
}

/// Divide every score by the list maximum. A maximum of 0 or below zeroes the list.
pub fn normalize_by_max(recommendations: &[Recommendation]) -> Vec<(MovieId, f64)> {
    let max = recommendations
        .iter()
        .map(|r| r.score)
        .fold(f64::NEG_INFINITY, f64::max);

    recommendations
        .iter()
        .map(|r| {
            let normalized = if max > 0.0 { r.score / max } else { 0.0 };
            (r.movie_id, normalized)
        })
        .collect()
}
