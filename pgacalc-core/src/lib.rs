//! Core library for the `pgacalc` CLI.
//!
//! This crate defines:
//! - Region classification and the ground motion model catalog
//! - The `gmm.xml` weight document parser and distance-gated selection
//! - Weighted combination of per-model means into one PGA value
//! - Configuration, resource lookup and the end-to-end calculation
//!
//! It is used by `pgacalc-cli`, but can also be reused by other binaries or services.

pub mod calc;
pub mod config;
pub mod ensemble;
pub mod evaluator;
pub mod geo;
pub mod gmm;
pub mod logic_tree;
pub mod model;
pub mod parser;
pub mod region;
pub mod resource;
pub mod validate;
pub mod weights;

pub use calc::{CalcError, Calculator};
pub use config::Config;
pub use ensemble::{Estimate, combine};
pub use evaluator::{CoefficientTable, MeanEvaluator};
pub use gmm::{Gmm, GmmInput};
pub use logic_tree::LogicTreeRegistry;
pub use model::{PgaRequest, PgaResponse};
pub use parser::{ConfigError, GmmsParser, gmm_weight_map};
pub use region::Region;
pub use resource::{ResourceError, ResourceLocator};
pub use weights::{SecondarySelection, WeightMapping, WeightedModelSet};
