//! Distance-gated model weightings for a single region.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, btree_map};

use crate::gmm::Gmm;

/// Allowed deviation of a weight sum from 1, per entry.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightError {
    #[error("Weight {weight} for {gmm} must be finite and non-negative")]
    InvalidWeight { gmm: Gmm, weight: f64 },

    #[error("Duplicate model {0}")]
    Duplicate(Gmm),

    #[error("Weights sum to {sum}, expected 1.0 (tolerance {tolerance:e})")]
    Sum { sum: f64, tolerance: f64 },

    #[error("Uncertainty values ({values}) and weights ({weights}) differ in length")]
    UncertaintyLength { values: usize, weights: usize },

    #[error("Uncertainty must list at least one value")]
    EmptyUncertainty,

    #[error("Distance {0} must be finite and non-negative")]
    InvalidDistance(f64),
}

/// Check that `weights` sum to 1 within `WEIGHT_TOLERANCE` scaled by the
/// number of entries.
pub fn check_weight_sum<I>(weights: I) -> Result<f64, WeightError>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = weights.into_iter().fold((0.0, 0usize), |(sum, n), w| (sum + w, n + 1));
    let tolerance = WEIGHT_TOLERANCE * count.max(1) as f64;
    if (sum - 1.0).abs() > tolerance {
        return Err(WeightError::Sum { sum, tolerance });
    }
    Ok(sum)
}

/// Ordered `Gmm -> weight` map. Iteration is always in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightMapping(BTreeMap<Gmm, f64>);

impl WeightMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. The sum is not checked here; see [`WeightMapping::validate`].
    pub fn insert(&mut self, gmm: Gmm, weight: f64) -> Result<(), WeightError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(WeightError::InvalidWeight { gmm, weight });
        }
        match self.0.entry(gmm) {
            btree_map::Entry::Occupied(_) => Err(WeightError::Duplicate(gmm)),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(weight);
                Ok(())
            }
        }
    }

    pub fn get(&self, gmm: Gmm) -> Option<f64> {
        self.0.get(&gmm).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Gmm, f64)> + '_ {
        self.0.iter().map(|(gmm, weight)| (*gmm, *weight))
    }

    pub fn models(&self) -> impl Iterator<Item = Gmm> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<(), WeightError> {
        check_weight_sum(self.0.values().copied()).map(|_| ())
    }
}

impl<const N: usize> TryFrom<[(Gmm, f64); N]> for WeightMapping {
    type Error = WeightError;

    fn try_from(entries: [(Gmm, f64); N]) -> Result<Self, Self::Error> {
        let mut mapping = WeightMapping::new();
        for (gmm, weight) in entries {
            mapping.insert(gmm, weight)?;
        }
        Ok(mapping)
    }
}

/// Discrete epistemic spread around a mean. Parsed and carried along, never
/// combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uncertainty {
    values: Vec<f64>,
    weights: Vec<f64>,
}

impl Uncertainty {
    pub fn new(values: Vec<f64>, weights: Vec<f64>) -> Result<Self, WeightError> {
        if values.len() != weights.len() {
            return Err(WeightError::UncertaintyLength {
                values: values.len(),
                weights: weights.len(),
            });
        }
        if values.is_empty() {
            return Err(WeightError::EmptyUncertainty);
        }
        Ok(Self { values, weights })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

/// A weight mapping that applies out to `max_distance` km.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSet {
    weights: WeightMapping,
    max_distance: f64,
    uncertainty: Option<Uncertainty>,
}

impl ModelSet {
    pub fn new(
        weights: WeightMapping,
        max_distance: f64,
        uncertainty: Option<Uncertainty>,
    ) -> Result<Self, WeightError> {
        if !max_distance.is_finite() || max_distance < 0.0 {
            return Err(WeightError::InvalidDistance(max_distance));
        }
        weights.validate()?;
        Ok(Self { weights, max_distance, uncertainty })
    }

    pub fn weights(&self) -> &WeightMapping {
        &self.weights
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn uncertainty(&self) -> Option<&Uncertainty> {
        self.uncertainty.as_ref()
    }

    pub fn applies_to(&self, distance: f64) -> bool {
        distance <= self.max_distance
    }
}

/// How the secondary set is chosen once a distance is beyond the primary
/// threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondarySelection {
    /// Secondary applies to every distance past the primary threshold.
    #[default]
    Fallback,
    /// Secondary applies only up to its own threshold.
    Gated,
}

impl SecondarySelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecondarySelection::Fallback => "fallback",
            SecondarySelection::Gated => "gated",
        }
    }
}

impl std::fmt::Display for SecondarySelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SecondarySelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fallback" => Ok(SecondarySelection::Fallback),
            "gated" => Ok(SecondarySelection::Gated),
            _ => Err(format!("Unknown secondary selection '{s}'. Expected 'fallback' or 'gated'.")),
        }
    }
}

/// One region's configuration: a near-field (primary) and optional far-field
/// (secondary) model set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedModelSet {
    primary: Option<ModelSet>,
    secondary: Option<ModelSet>,
    set_count: usize,
    #[serde(default)]
    policy: SecondarySelection,
}

impl WeightedModelSet {
    pub fn new(primary: Option<ModelSet>, secondary: Option<ModelSet>, set_count: usize) -> Self {
        Self { primary, secondary, set_count, policy: SecondarySelection::default() }
    }

    pub fn with_policy(mut self, policy: SecondarySelection) -> Self {
        self.policy = policy;
        self
    }

    pub fn primary(&self) -> Option<&ModelSet> {
        self.primary.as_ref()
    }

    pub fn secondary(&self) -> Option<&ModelSet> {
        self.secondary.as_ref()
    }

    /// Number of blocks in the source document that matched the region,
    /// including ones that listed no models.
    pub fn set_count(&self) -> usize {
        self.set_count
    }

    pub fn policy(&self) -> SecondarySelection {
        self.policy
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }

    /// Weight mapping to use for a source `distance` km from the site.
    /// Returns an empty mapping when no set applies.
    pub fn select(&self, distance: f64) -> WeightMapping {
        let Some(primary) = &self.primary else {
            return WeightMapping::new();
        };
        if primary.applies_to(distance) {
            return primary.weights.clone();
        }
        match (&self.secondary, self.policy) {
            (Some(secondary), SecondarySelection::Fallback) => secondary.weights.clone(),
            (Some(secondary), SecondarySelection::Gated) if secondary.applies_to(distance) => {
                secondary.weights.clone()
            }
            _ => WeightMapping::new(),
        }
    }
}
