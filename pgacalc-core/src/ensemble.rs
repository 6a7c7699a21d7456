//! Weighted combination of model means.
//!
//! Means arrive as natural logs; they are combined in linear space:
//! `Σ wᵢ·exp(μᵢ)`, renormalized by `Σ wᵢ` when the weights do not already
//! sum to exactly 1.

use std::collections::BTreeMap;

use crate::{gmm::Gmm, weights::WeightMapping};

/// Log-domain mean per model.
pub type ModelMeans = BTreeMap<Gmm, f64>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CombineError {
    #[error("No mean supplied for {0}")]
    MissingMean(Gmm),
}

/// Combined value, or nothing when no model applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    Value(f64),
    NoEstimate,
}

impl Estimate {
    pub fn value(&self) -> Option<f64> {
        match self {
            Estimate::Value(v) => Some(*v),
            Estimate::NoEstimate => None,
        }
    }

    pub fn is_estimate(&self) -> bool {
        matches!(self, Estimate::Value(_))
    }
}

/// One model's share of a combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub gmm: Gmm,
    pub weight: f64,
    /// Linear-domain mean, `exp(ln_mean)`.
    pub mean: f64,
}

/// Outcome of [`combine_detailed`].
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub value: f64,
    pub total_weight: f64,
    pub contributions: Vec<Contribution>,
}

impl Combination {
    pub fn estimate(&self) -> Estimate {
        if self.contributions.is_empty() {
            Estimate::NoEstimate
        } else {
            Estimate::Value(self.value)
        }
    }
}

/// Combine log-domain `means` with `weights`. An empty mapping yields 0.
pub fn combine(weights: &WeightMapping, means: &ModelMeans) -> Result<f64, CombineError> {
    combine_detailed(weights, means).map(|combination| combination.value)
}

pub fn combine_detailed(
    weights: &WeightMapping,
    means: &ModelMeans,
) -> Result<Combination, CombineError> {
    let mut value = 0.0;
    let mut total_weight = 0.0;
    let mut contributions = Vec::with_capacity(weights.len());

    for (gmm, weight) in weights.iter() {
        let ln_mean = means.get(&gmm).copied().ok_or(CombineError::MissingMean(gmm))?;
        let mean = ln_mean.exp();
        value += mean * weight;
        total_weight += weight;
        contributions.push(Contribution { gmm, weight, mean });
    }

    if total_weight != 0.0 && total_weight != 1.0 {
        value /= total_weight;
    }

    Ok(Combination { value, total_weight, contributions })
}
