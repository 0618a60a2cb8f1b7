//! Hybrid blend weights
//!
//! Callers may override any subset of the three weights with a JSON object
//! such as `{"content": 0.6}`. Missing keys keep their defaults. Accepted
//! weights are rescaled to sum to 1 before fusion.

use crate::error::{FusionError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HybridWeights {
    pub content: f64,
    pub collaborative_user: f64,
    pub collaborative_item: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            content: 0.4,
            collaborative_user: 0.3,
            collaborative_item: 0.3,
        }
    }
}

impl HybridWeights {
    pub fn new(content: f64, collaborative_user: f64, collaborative_item: f64) -> Self {
        Self {
            content,
            collaborative_user,
            collaborative_item,
        }
    }

    /// Parse a partial override on top of the defaults, validate, rescale
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_over(json, Self::default())
    }

    /// Like `from_json`, with `base` supplying the keys the caller omits
    pub fn from_json_over(json: &str, base: HybridWeights) -> Result<Self> {
        let overrides: WeightOverrides = serde_json::from_str(json)?;
        let merged = Self {
            content: overrides.content.unwrap_or(base.content),
            collaborative_user: overrides
                .collaborative_user
                .unwrap_or(base.collaborative_user),
            collaborative_item: overrides
                .collaborative_item
                .unwrap_or(base.collaborative_item),
        };
        merged.normalized()
    }

    fn entries(&self) -> [(&'static str, f64); 3] {
        [
            ("content", self.content),
            ("collaborative_user", self.collaborative_user),
            ("collaborative_item", self.collaborative_item),
        ]
    }

    /// Every weight finite and non-negative, at least one positive
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.entries() {
            if !value.is_finite() {
                return Err(FusionError::NonFiniteWeight { key });
            }
            if value < 0.0 {
                return Err(FusionError::NegativeWeight { key, value });
            }
        }
        if self.sum() == 0.0 {
            return Err(FusionError::AllZeroWeights);
        }
        Ok(())
    }

    pub fn sum(&self) -> f64 {
        self.content + self.collaborative_user + self.collaborative_item
    }

    /// Validated copy rescaled to sum to 1
    pub fn normalized(&self) -> Result<Self> {
        self.validate()?;
        let total = self.sum();
        Ok(Self {
            content: self.content / total,
            collaborative_user: self.collaborative_user / total,
            collaborative_item: self.collaborative_item / total,
        })
    }
}

/// Wire form of a caller override; absent keys stay `None`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct WeightOverrides {
    content: Option<f64>,
    collaborative_user: Option<f64>,
    collaborative_item: Option<f64>,
}
