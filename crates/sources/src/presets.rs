//! Taste presets
//!
//! Named genre bundles for visitors without history ("action_fan",
//! "drama_lover", ...). The table is built once and never mutated.

use crate::popularity::PopularitySource;
use crate::types::{Recommendation, RecommendationMethod};
use data_loader::{CatalogStore, GenreAccessor, MovieAccessor, MovieBrief};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

const DEFAULT_PRESETS: &[(&str, &[&str])] = &[
    ("action_fan", &["Action", "Adventure", "Sci-Fi"]),
    ("drama_lover", &["Drama", "Romance"]),
    ("comedy_enthusiast", &["Comedy", "Animation"]),
    ("thriller_addict", &["Thriller", "Horror", "Mystery"]),
    ("documentary_watcher", &["Documentary"]),
    ("family_viewer", &["Family", "Children", "Animation"]),
    ("classic_cinephile", &["Film-Noir", "Classic", "Western"]),
    ("international_fan", &["Foreign", "Independent"]),
    ("musical_appreciator", &["Musical"]),
];

/// Immutable map of preset name to genre names
#[derive(Debug, Clone, PartialEq)]
pub struct TastePresets {
    presets: BTreeMap<String, Vec<String>>,
}

impl TastePresets {
    /// Build from a name -> genres map. Repeated genres within a preset are dropped.
    pub fn from_map(presets: BTreeMap<String, Vec<String>>) -> Self {
        let presets = presets
            .into_iter()
            .map(|(name, mut genres)| {
                let mut seen = Vec::with_capacity(genres.len());
                genres.retain(|g| {
                    if seen.contains(g) {
                        false
                    } else {
                        seen.push(g.clone());
                        true
                    }
                });
                (name, genres)
            })
            .collect();
        Self { presets }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.presets.get(name).map(Vec::as_slice)
    }

    /// Preset names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for TastePresets {
    fn default() -> Self {
        let presets = DEFAULT_PRESETS
            .iter()
            .map(|(name, genres)| {
                (
                    name.to_string(),
                    genres.iter().map(|g| g.to_string()).collect(),
                )
            })
            .collect();
        Self::from_map(presets)
    }
}

/// Recommends catalog movies for a taste preset
#[derive(Clone)]
pub struct ProfileSource {
    store: Arc<dyn CatalogStore>,
    presets: Arc<TastePresets>,
    popularity: PopularitySource,
}

struct PresetMatch {
    movie: MovieBrief,
    matches: usize,
}

impl ProfileSource {
    pub fn new(store: Arc<dyn CatalogStore>, presets: Arc<TastePresets>) -> Self {
        Self {
            popularity: PopularitySource::new(Arc::clone(&store)),
            store,
            presets,
        }
    }

    /// Movies sharing at least one preset genre, most matches first
    ///
    /// Ordering is matches, then vote average, then popularity (all
    /// descending), then movie id. The score, `(matches / preset size) *
    /// (vote_average / 10)`, is reported but does not drive the order.
    /// An unknown preset falls back to popularity.
    #[instrument(skip(self))]
    pub fn get_recommendations(&self, profile_name: &str, limit: usize) -> Vec<Recommendation> {
        let Some(genres) = self.presets.get(profile_name) else {
            debug!("Unknown preset {:?}; falling back to popularity", profile_name);
            return self.popularity.get_recommendations(limit);
        };

        let mut candidates: Vec<PresetMatch> = self
            .store
            .all_movies_brief()
            .into_iter()
            .filter_map(|movie| {
                let movie_genres = self.store.genres_for_movie(movie.id)?;
                let matches = genres.iter().filter(|g| movie_genres.contains(*g)).count();
                (matches > 0).then_some(PresetMatch { movie, matches })
            })
            .collect();
        debug!("{} movies match preset {:?}", candidates.len(), profile_name);

        candidates.sort_by(|a, b| {
            b.matches
                .cmp(&a.matches)
                .then_with(|| {
                    b.movie
                        .vote_average
                        .partial_cmp(&a.movie.vote_average)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| {
                    b.movie
                        .popularity
                        .partial_cmp(&a.movie.popularity)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.movie.id.cmp(&b.movie.id))
        });
        candidates.truncate(limit);

        let preset_size = genres.len() as f64;
        candidates
            .into_iter()
            .map(|c| {
                let score =
                    (c.matches as f64 / preset_size) * (f64::from(c.movie.vote_average) / 10.0);
                Recommendation::new(c.movie.id, RecommendationMethod::Profile, score)
            })
            .collect()
    }
}
