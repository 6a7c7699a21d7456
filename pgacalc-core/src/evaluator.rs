use std::fmt::Debug;

use crate::{
    ensemble::ModelMeans,
    gmm::{Gmm, GmmInput},
    weights::WeightMapping,
};

pub mod coefficients;

pub use coefficients::{COEFFS_FILENAME, CoefficientTable, Coefficients};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("No coefficients available for {0}")]
    Unsupported(Gmm),

    #[error("{gmm} produced a non-finite mean ({mean})")]
    NonFinite { gmm: Gmm, mean: f64 },
}

/// Source of log-domain PGA means for individual models.
pub trait MeanEvaluator: Debug {
    /// Natural log of the median PGA (g).
    fn ln_mean(&self, gmm: Gmm, input: &GmmInput) -> Result<f64, EvalError>;
}

/// Evaluate every model named in `weights`.
pub fn evaluate_all(
    evaluator: &dyn MeanEvaluator,
    weights: &WeightMapping,
    input: &GmmInput,
) -> Result<ModelMeans, EvalError> {
    weights
        .models()
        .map(|gmm| {
            let mean = evaluator.ln_mean(gmm, input)?;
            if !mean.is_finite() {
                return Err(EvalError::NonFinite { gmm, mean });
            }
            Ok((gmm, mean))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed;

    impl MeanEvaluator for Fixed {
        fn ln_mean(&self, gmm: Gmm, _input: &GmmInput) -> Result<f64, EvalError> {
            match gmm {
                Gmm::Ask14 => Ok(-2.0),
                Gmm::Bssa14 => Ok(-1.5),
                Gmm::Cy14 => Ok(f64::NAN),
                other => Err(EvalError::Unsupported(other)),
            }
        }
    }

    fn input() -> GmmInput {
        GmmInput { mag: 6.5, r_jb: 10.0, r_rup: 12.0, r_x: 10.0, z_top: 6.0, vs30: 760.0 }
    }

    #[test]
    fn evaluates_each_weighted_model() {
        let weights = WeightMapping::try_from([(Gmm::Ask14, 0.6), (Gmm::Bssa14, 0.4)]).unwrap();
        let means = evaluate_all(&Fixed, &weights, &input()).unwrap();
        assert_eq!(means.len(), 2);
        assert_eq!(means[&Gmm::Ask14], -2.0);
        assert_eq!(means[&Gmm::Bssa14], -1.5);
    }

    #[test]
    fn empty_weights_evaluate_nothing() {
        let means = evaluate_all(&Fixed, &WeightMapping::new(), &input()).unwrap();
        assert!(means.is_empty());
    }

    #[test]
    fn errors_propagate() {
        let weights = WeightMapping::try_from([(Gmm::Ask14, 0.5), (Gmm::Cb14, 0.5)]).unwrap();
        assert_eq!(
            evaluate_all(&Fixed, &weights, &input()),
            Err(EvalError::Unsupported(Gmm::Cb14))
        );

        let weights = WeightMapping::try_from([(Gmm::Cy14, 1.0)]).unwrap();
        assert!(matches!(
            evaluate_all(&Fixed, &weights, &input()),
            Err(EvalError::NonFinite { gmm: Gmm::Cy14, .. })
        ));
    }
}
