use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::gmm::{Gmm, GmmInput};

use super::{EvalError, MeanEvaluator};

/// Resource name of the coefficient table.
pub const COEFFS_FILENAME: &str = "gmm-coeffs.toml";

/// Reference magnitude and site velocity of the functional form.
const M_REF: f64 = 6.0;
const VS30_REF: f64 = 760.0;

/// Coefficients of a generic attenuation relation:
///
/// `ln Y = c0 + c1·(M−6) + c2·(M−6)² + c3·ln(√(R² + h²)) + c4·R + c5·ln(Vs30/760)`
///
/// with `R` the rupture distance in km and `Y` the median PGA in g.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub c0: f64,
    pub c1: f64,
    #[serde(default)]
    pub c2: f64,
    pub c3: f64,
    #[serde(default)]
    pub c4: f64,
    #[serde(default)]
    pub c5: f64,
    pub h: f64,
}

impl Coefficients {
    pub fn ln_mean(&self, input: &GmmInput) -> f64 {
        let dm = input.mag - M_REF;
        let r = input.r_rup.hypot(self.h);
        self.c0
            + self.c1 * dm
            + self.c2 * dm * dm
            + self.c3 * r.ln()
            + self.c4 * input.r_rup
            + self.c5 * (input.vs30 / VS30_REF).ln()
    }
}

#[derive(Debug, Deserialize)]
struct CoefficientFile {
    models: BTreeMap<String, Coefficients>,
}

/// Per-model coefficients, keyed by catalog identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoefficientTable {
    table: BTreeMap<Gmm, Coefficients>,
}

impl CoefficientTable {
    /// Parse a table such as:
    ///
    /// ```toml
    /// [models.ASK_14]
    /// c0 = 1.2
    /// c1 = 0.9
    /// c3 = -1.15
    /// h = 6.0
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: CoefficientFile =
            toml::from_str(contents).context("Failed to parse ground motion coefficients")?;

        let mut table = BTreeMap::new();
        for (id, coefficients) in file.models {
            let gmm: Gmm = id
                .parse()
                .with_context(|| format!("Invalid coefficient table entry [models.{id}]"))?;
            if coefficients.h <= 0.0 {
                let h = coefficients.h;
                return Err(anyhow!("Coefficient h for {gmm} must be positive, got {h}"));
            }
            table.insert(gmm, coefficients);
        }
        Ok(Self { table })
    }

    pub fn insert(&mut self, gmm: Gmm, coefficients: Coefficients) {
        self.table.insert(gmm, coefficients);
    }

    pub fn get(&self, gmm: Gmm) -> Option<&Coefficients> {
        self.table.get(&gmm)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl MeanEvaluator for CoefficientTable {
    fn ln_mean(&self, gmm: Gmm, input: &GmmInput) -> Result<f64, EvalError> {
        self.get(gmm)
            .map(|coefficients| coefficients.ln_mean(input))
            .ok_or(EvalError::Unsupported(gmm))
    }
}
