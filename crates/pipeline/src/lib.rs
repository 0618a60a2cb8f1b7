//! Hybrid fusion of ranked recommendation lists.
//!
//! This crate provides:
//! - HybridWeights: the blend weights, with caller overrides and validation
//! - HybridFusion: max-normalization and weighted accumulation
//!
//! ## Architecture
//! The hybrid strategy runs in stages:
//! 1. Sources produce content, user CF and item CF lists (at twice the limit)
//! 2. Each list is normalized by its maximum score
//! 3. Normalized scores are weighted and summed per movie
//! 4. The union is ranked and truncated
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{HybridFusion, HybridWeights};
//!
//! let weights = HybridWeights::from_json(r#"{"content": 0.6}"#)?;
//! let fused = HybridFusion::from_weights(&weights, content, user_cf, item_cf).fuse(20);
//! ```

pub mod error;
pub mod fusion;
pub mod weights;

// Re-export main types
pub use error::{FusionError, Result};
pub use fusion::{normalize_by_max, HybridFusion};
pub use weights::HybridWeights;
